//! URL-safe record identifiers.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Unique, URL-safe record identifier (lowercase kebab-case)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Parse and validate a slug
    pub fn parse(value: impl Into<String>) -> Result<Self, RegistryError> {
        let value = value.into();
        match slug_problem(&value) {
            None => Ok(Self(value)),
            Some(reason) => Err(RegistryError::invalid_record(Some(&value), reason)),
        }
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Describe why `value` is not a valid slug, if it isn't
fn slug_problem(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("slug is empty");
    }
    if value.starts_with('-') || value.ends_with('-') {
        return Some("slug must not start or end with a hyphen");
    }
    if value.contains("--") {
        return Some("slug must not contain consecutive hyphens");
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Some("slug must be lowercase kebab-case");
    }
    None
}

impl TryFrom<String> for Slug {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl Borrow<str> for Slug {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}
