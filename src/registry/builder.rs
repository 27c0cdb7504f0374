//! All-or-nothing registry construction.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::search::SearchKey;
use super::Registry;
use crate::domain::{ContentRecord, ContentSection, RawRecord, RawSection, SectionEntry, Slug};
use crate::error::RegistryError;

/// Collects raw definitions, then validates and indexes them in one step
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    records: Vec<RawRecord>,
    sections: Vec<RawSection>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record definition
    pub fn record(mut self, record: RawRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Add multiple record definitions, in order
    pub fn records(mut self, records: impl IntoIterator<Item = RawRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Add a section definition
    pub fn section(mut self, section: RawSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Add multiple section definitions, in order
    pub fn sections(mut self, sections: impl IntoIterator<Item = RawSection>) -> Self {
        self.sections.extend(sections);
        self
    }

    /// Validate every definition and build the indices
    ///
    /// Records are indexed in input order, followed by any records defined
    /// inline in sections (in section order). The first invalid definition
    /// aborts the whole build.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut index = RecordIndex::default();

        for raw in self.records {
            index.insert(ContentRecord::from_raw(raw)?)?;
        }

        // Hoist inline records before resolving, so a section may reference
        // a record defined inline by a later section.
        let mut pending = Vec::with_capacity(self.sections.len());
        for raw in self.sections {
            let tag = raw
                .tag
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| RegistryError::invalid_section(None, "tag is missing"))?
                .to_string();

            let mut slugs = Vec::with_capacity(raw.record_slugs.len());
            for entry in raw.record_slugs {
                match entry {
                    SectionEntry::Slug(slug) => slugs.push(slug.trim().to_string()),
                    SectionEntry::Inline(record) => {
                        let record = ContentRecord::from_raw(*record)?;
                        slugs.push(record.slug().to_string());
                        index.insert(record)?;
                    }
                }
            }
            pending.push((tag, slugs));
        }

        let mut sections: Vec<ContentSection> = Vec::with_capacity(pending.len());
        let mut section_index: HashMap<String, usize> = HashMap::with_capacity(pending.len());
        for (tag, slugs) in pending {
            if section_index.contains_key(&tag) {
                return Err(RegistryError::DuplicateSection(tag));
            }

            let mut seen = HashSet::with_capacity(slugs.len());
            let mut rules: Vec<Slug> = Vec::with_capacity(slugs.len());
            for slug in slugs {
                let Some(&pos) = index.by_slug.get(slug.as_str()) else {
                    return Err(RegistryError::UnknownSlugInSection { section: tag, slug });
                };
                if !seen.insert(pos) {
                    return Err(RegistryError::DuplicateSlugInSection { section: tag, slug });
                }
                rules.push(index.records[pos].slug().clone());
            }

            section_index.insert(tag.clone(), sections.len());
            sections.push(ContentSection::new(tag, rules));
        }

        debug!(
            records = index.records.len(),
            tags = index.tag_order.len(),
            sections = sections.len(),
            "Registry indexed"
        );

        let search_keys = index.records.iter().map(SearchKey::new).collect();

        Ok(Registry {
            records: index.records,
            by_slug: index.by_slug,
            by_tag: index.by_tag,
            tag_order: index.tag_order,
            sections,
            section_index,
            search_keys,
        })
    }
}

/// Primary and tag indices, filled record by record
#[derive(Default)]
struct RecordIndex {
    records: Vec<ContentRecord>,
    by_slug: HashMap<Slug, usize>,
    by_tag: HashMap<String, Vec<usize>>,
    tag_order: Vec<String>,
}

impl RecordIndex {
    fn insert(&mut self, record: ContentRecord) -> Result<(), RegistryError> {
        if self.by_slug.contains_key(record.slug()) {
            return Err(RegistryError::DuplicateSlug(record.slug().to_string()));
        }

        let pos = self.records.len();
        for tag in record.tags() {
            match self.by_tag.get_mut(tag) {
                Some(positions) => positions.push(pos),
                None => {
                    self.by_tag.insert(tag.clone(), vec![pos]);
                    self.tag_order.push(tag.clone());
                }
            }
        }

        self.by_slug.insert(record.slug().clone(), pos);
        self.records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slug: &str) -> RawRecord {
        RawRecord::new(slug, slug.to_uppercase())
    }

    #[test]
    fn test_empty_build() {
        let registry = RegistryBuilder::new().build().unwrap();
        assert!(registry.is_empty());
        assert!(registry.list_sections().is_empty());
    }

    #[test]
    fn test_duplicate_slug_fails() {
        let err = RegistryBuilder::new()
            .record(record("hono"))
            .record(record("nextjs"))
            .record(record("hono"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateSlug("hono".to_string()));
    }

    #[test]
    fn test_missing_section_tag() {
        let err = RegistryBuilder::new()
            .record(record("hono"))
            .section(RawSection {
                tag: None,
                record_slugs: vec![SectionEntry::Slug("hono".to_string())],
            })
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::invalid_section(None, "tag is missing"));
    }

    #[test]
    fn test_duplicate_section_fails() {
        let err = RegistryBuilder::new()
            .record(record("hono"))
            .section(RawSection::new("Official", ["hono"]))
            .section(RawSection::new("Official", Vec::<String>::new()))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateSection("Official".to_string()));
    }

    #[test]
    fn test_slug_repeated_in_section_fails() {
        let err = RegistryBuilder::new()
            .record(record("hono"))
            .section(RawSection::new("Official", ["hono", "hono"]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateSlugInSection {
                section: "Official".to_string(),
                slug: "hono".to_string(),
            }
        );
    }

    #[test]
    fn test_inline_records_hoisted() {
        let registry = RegistryBuilder::new()
            .record(record("hono"))
            .section(RawSection::new("Official", ["hono", "nextjs"]))
            .section(RawSection::new("Community", Vec::<String>::new()).with_inline(record("nextjs")))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        let official = registry.section("Official").unwrap();
        let titles: Vec<_> = registry
            .section_records(official)
            .iter()
            .map(|r| r.title())
            .collect();
        assert_eq!(titles, vec!["HONO", "NEXTJS"]);
    }

    #[test]
    fn test_inline_record_duplicating_top_level_fails() {
        let err = RegistryBuilder::new()
            .record(record("hono"))
            .section(RawSection::new("Official", Vec::<String>::new()).with_inline(record("hono")))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateSlug("hono".to_string()));
    }
}
