//! Validated content records.

use serde::Serialize;

use super::raw::{RawAuthor, RawRecord};
use super::slug::Slug;
use crate::error::RegistryError;

/// A single content/rule entry
///
/// Only produced by validating a [`RawRecord`], so every instance satisfies
/// the slug, title, tag and author invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRecord {
    slug: Slug,
    title: String,
    tags: Vec<String>,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<Author>,
    libs: Vec<String>,
}

impl ContentRecord {
    /// Validate a raw record
    pub fn from_raw(raw: RawRecord) -> Result<Self, RegistryError> {
        let slug_str = raw
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RegistryError::invalid_record(None, "slug is missing"))?;
        let slug = Slug::parse(slug_str)?;

        let title = raw
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RegistryError::invalid_record(Some(slug.as_str()), "title is missing"))?
            .to_string();

        let tags = clean_labels(raw.tags.unwrap_or_default(), "tag", true)
            .map_err(|reason| RegistryError::invalid_record(Some(slug.as_str()), reason))?;
        let libs = clean_labels(raw.libs.unwrap_or_default(), "lib", false)
            .map_err(|reason| RegistryError::invalid_record(Some(slug.as_str()), reason))?;

        let author = raw
            .author
            .map(|a| Author::from_raw(a, &slug))
            .transpose()?;

        Ok(Self {
            slug,
            title,
            tags,
            content: raw.content.unwrap_or_default(),
            author,
            libs,
        })
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Tags in first-seen order, without duplicates
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Check tag membership (exact match)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Markdown body; opaque to the registry
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub fn libs(&self) -> &[String] {
        &self.libs
    }
}

/// Trim labels and reject blanks, optionally dropping repeats
fn clean_labels(labels: Vec<String>, kind: &str, dedupe: bool) -> Result<Vec<String>, String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            return Err(format!("{} is empty", kind));
        }
        if dedupe && cleaned.iter().any(|l| l == label) {
            continue;
        }
        cleaned.push(label.to_string());
    }
    Ok(cleaned)
}

/// Structured attribution for a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
}

impl Author {
    fn from_raw(raw: RawAuthor, slug: &Slug) -> Result<Self, RegistryError> {
        let name = raw
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| RegistryError::invalid_record(Some(slug.as_str()), "author name is missing"))?
            .to_string();

        let url = match raw.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            Some(url) if !is_well_formed_uri(&url) => {
                return Err(RegistryError::invalid_record(
                    Some(slug.as_str()),
                    format!("author url is not a well-formed URI: {}", url),
                ));
            }
            url => url,
        };

        let avatar = raw
            .avatar
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        Ok(Self { name, url, avatar })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }
}

/// Absolute URI check: RFC 3986 scheme, a colon, then a non-empty body
/// without whitespace
pub fn is_well_formed_uri(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok || rest.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }

    // Hierarchical URIs need an authority
    match rest.strip_prefix("//") {
        Some(authority) => authority
            .split(['/', '?', '#'])
            .next()
            .is_some_and(|host| !host.is_empty()),
        None => true,
    }
}
