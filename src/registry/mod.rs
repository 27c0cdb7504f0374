//! The content registry.
//!
//! A [`Registry`] owns every record and section for one process lifetime.
//! It is built once from raw definitions, is immutable afterwards, and
//! answers read-only queries by reference.
//!
//! # Indices
//!
//! ```text
//! records   Vec<ContentRecord>        insertion order
//! by_slug   slug -> position          O(1) lookup
//! by_tag    tag  -> [position, ...]   insertion order per tag
//! sections  Vec<ContentSection>       definition order, slugs only
//! ```

pub mod builder;
pub mod search;
pub mod shared;
pub mod validation;

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{ContentRecord, ContentSection, RawRecord, RawSection, Slug};
use crate::error::RegistryError;

pub use builder::RegistryBuilder;
pub use search::{MatchRank, SearchHit};
pub use shared::SharedRegistry;
pub use validation::{ValidationPolicy, ValidationReport, ValidationWarning};

use search::SearchKey;

/// Immutable, indexed collection of records and sections
#[derive(Debug, Clone)]
pub struct Registry {
    records: Vec<ContentRecord>,
    by_slug: HashMap<Slug, usize>,
    by_tag: HashMap<String, Vec<usize>>,
    tag_order: Vec<String>,
    sections: Vec<ContentSection>,
    section_index: HashMap<String, usize>,
    search_keys: Vec<SearchKey>,
}

/// A distinct tag and how many records carry it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagCount<'a> {
    pub tag: &'a str,
    pub count: usize,
}

/// Registry size summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub records: usize,
    pub sections: usize,
    pub tags: usize,
}

impl Registry {
    /// Start an empty builder
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build from records and sections in one call
    pub fn build(
        records: impl IntoIterator<Item = RawRecord>,
        sections: impl IntoIterator<Item = RawSection>,
    ) -> Result<Self, RegistryError> {
        RegistryBuilder::new()
            .records(records)
            .sections(sections)
            .build()
    }

    /// Exact slug lookup
    pub fn get_by_slug(&self, slug: &str) -> Option<&ContentRecord> {
        self.by_slug.get(slug).map(|&pos| &self.records[pos])
    }

    /// Exact slug lookup, with absence as a [`RegistryError::NotFound`] value
    pub fn require(&self, slug: &str) -> Result<&ContentRecord, RegistryError> {
        self.get_by_slug(slug)
            .ok_or_else(|| RegistryError::NotFound(slug.to_string()))
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }

    /// Records carrying `tag`, in insertion order; empty for unknown tags
    pub fn list_by_tag(&self, tag: &str) -> Vec<&ContentRecord> {
        self.by_tag
            .get(tag)
            .map(|positions| positions.iter().map(|&pos| &self.records[pos]).collect())
            .unwrap_or_default()
    }

    /// Sections in definition order
    pub fn list_sections(&self) -> &[ContentSection] {
        &self.sections
    }

    /// Section by label
    pub fn section(&self, tag: &str) -> Option<&ContentSection> {
        self.section_index.get(tag).map(|&pos| &self.sections[pos])
    }

    /// Resolve a section's slugs to records, in section order
    pub fn section_records(&self, section: &ContentSection) -> Vec<&ContentRecord> {
        section
            .rules()
            .iter()
            .filter_map(|slug| self.get_by_slug(slug.as_str()))
            .collect()
    }

    /// Sections that list `slug`, in definition order
    pub fn sections_for(&self, slug: &str) -> Vec<&ContentSection> {
        self.sections.iter().filter(|s| s.contains(slug)).collect()
    }

    /// Ranked, case-insensitive search over titles and tags
    pub fn search(&self, query: &str) -> Vec<&ContentRecord> {
        self.search_ranked(query)
            .into_iter()
            .map(|hit| hit.record)
            .collect()
    }

    /// Like [`search`](Self::search), keeping the tier each record matched at
    pub fn search_ranked(&self, query: &str) -> Vec<SearchHit<'_>> {
        search::ranked(&self.records, &self.search_keys, query)
    }

    /// All records in insertion order
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    /// Distinct tags in first-seen order
    pub fn tags(&self) -> Vec<TagCount<'_>> {
        self.tag_order
            .iter()
            .map(|tag| TagCount {
                tag: tag.as_str(),
                count: self.by_tag.get(tag).map_or(0, Vec::len),
            })
            .collect()
    }

    /// Run the non-fatal validation pass
    pub fn validate(&self, policy: &ValidationPolicy) -> ValidationReport {
        validation::validate(self, policy)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            records: self.records.len(),
            sections: self.sections.len(),
            tags: self.tag_order.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
