//! Named groupings of records.

use serde::Serialize;

use super::slug::Slug;

/// A named, ordered grouping of records
///
/// Sections hold slugs, not records; resolve them through
/// [`Registry::section_records`](crate::Registry::section_records).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSection {
    tag: String,
    rules: Vec<Slug>,
}

impl ContentSection {
    pub(crate) fn new(tag: String, rules: Vec<Slug>) -> Self {
        Self { tag, rules }
    }

    /// Section label (e.g. "Official")
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Record slugs in definition order
    pub fn rules(&self) -> &[Slug] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.rules.iter().any(|s| s.as_str() == slug)
    }
}
