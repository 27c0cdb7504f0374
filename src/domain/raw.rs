//! Raw, loosely-typed record and section definitions.
//!
//! These mirror whatever the content source hands us. Every field is
//! optional here so that a missing `slug` or `title` surfaces as a
//! [`RegistryError::InvalidRecord`](crate::RegistryError::InvalidRecord)
//! from the builder instead of an opaque deserialization failure.

use serde::{Deserialize, Serialize};

/// Record definition as supplied by a content source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Markdown body
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub libs: Option<Vec<String>>,

    #[serde(default)]
    pub author: Option<RawAuthor>,
}

impl RawRecord {
    /// Create a raw record with the two required fields set
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    /// Add multiple tags
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags
            .get_or_insert_with(Vec::new)
            .extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the markdown content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Add an associated library
    pub fn with_lib(mut self, lib: impl Into<String>) -> Self {
        self.libs.get_or_insert_with(Vec::new).push(lib.into());
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: RawAuthor) -> Self {
        self.author = Some(author);
        self
    }
}

/// Author attribution as supplied by a content source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAuthor {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,
}

impl RawAuthor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Section definition as supplied by a content source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSection {
    #[serde(default)]
    pub tag: Option<String>,

    #[serde(
        default,
        rename = "recordSlugs",
        alias = "record_slugs",
        alias = "rules",
        alias = "slugs"
    )]
    pub record_slugs: Vec<SectionEntry>,
}

impl RawSection {
    /// Create a section referencing records by slug
    pub fn new(tag: impl Into<String>, slugs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tag: Some(tag.into()),
            record_slugs: slugs
                .into_iter()
                .map(|s| SectionEntry::Slug(s.into()))
                .collect(),
        }
    }

    /// Append a record defined inline in the section
    pub fn with_inline(mut self, record: RawRecord) -> Self {
        self.record_slugs.push(SectionEntry::Inline(Box::new(record)));
        self
    }
}

/// One entry of a section's record list
///
/// Sources may either reference a record by slug or embed the full record.
/// Inline records are hoisted into the registry's record list at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionEntry {
    Slug(String),
    Inline(Box<RawRecord>),
}
