//! Non-fatal content checks.
//!
//! Construction already rejects structurally invalid data. This pass flags
//! records that are valid but look incomplete, such as placeholder bodies.

use serde::{Deserialize, Serialize};

use super::Registry;

/// Content the source data ships as a stand-in for a real rule body
pub const DEFAULT_PLACEHOLDER: &str = "Write the rule";

/// Settings for the validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Bodies equal to one of these (trimmed, ASCII case-insensitive) are placeholders
    #[serde(default = "default_placeholder_markers")]
    pub placeholder_markers: Vec<String>,

    /// Treat any warning as a failure
    #[serde(default)]
    pub strict: bool,
}

fn default_placeholder_markers() -> Vec<String> {
    vec![DEFAULT_PLACEHOLDER.to_string()]
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            placeholder_markers: default_placeholder_markers(),
            strict: false,
        }
    }
}

impl ValidationPolicy {
    /// Return the marker `content` matches, if any
    pub fn placeholder_marker(&self, content: &str) -> Option<&str> {
        let content = content.trim();
        self.placeholder_markers
            .iter()
            .map(|m| m.trim())
            .find(|m| !m.is_empty() && m.eq_ignore_ascii_case(content))
    }
}

/// A valid-but-incomplete finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    EmptyContent { slug: String },
    PlaceholderContent { slug: String, marker: String },
    Untagged { slug: String },
    Unsectioned { slug: String },
}

impl ValidationWarning {
    pub fn slug(&self) -> &str {
        match self {
            Self::EmptyContent { slug }
            | Self::PlaceholderContent { slug, .. }
            | Self::Untagged { slug }
            | Self::Unsectioned { slug } => slug,
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent { slug } => write!(f, "{}: content is empty", slug),
            Self::PlaceholderContent { slug, marker } => {
                write!(f, "{}: content is placeholder text ({:?})", slug, marker)
            }
            Self::Untagged { slug } => write!(f, "{}: record has no tags", slug),
            Self::Unsectioned { slug } => write!(f, "{}: record is not in any section", slug),
        }
    }
}

/// Result of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warnings for one record
    pub fn for_slug<'a>(&'a self, slug: &'a str) -> impl Iterator<Item = &'a ValidationWarning> {
        self.warnings.iter().filter(move |w| w.slug() == slug)
    }
}

pub(crate) fn validate(registry: &Registry, policy: &ValidationPolicy) -> ValidationReport {
    let has_sections = !registry.list_sections().is_empty();
    let mut warnings = Vec::new();

    for record in registry.records() {
        let slug = record.slug().to_string();

        if record.content().trim().is_empty() {
            warnings.push(ValidationWarning::EmptyContent { slug: slug.clone() });
        } else if let Some(marker) = policy.placeholder_marker(record.content()) {
            warnings.push(ValidationWarning::PlaceholderContent {
                slug: slug.clone(),
                marker: marker.to_string(),
            });
        }

        if record.tags().is_empty() {
            warnings.push(ValidationWarning::Untagged { slug: slug.clone() });
        }

        if has_sections && registry.sections_for(record.slug().as_str()).is_empty() {
            warnings.push(ValidationWarning::Unsectioned { slug });
        }
    }

    tracing::debug!(
        records = registry.len(),
        warnings = warnings.len(),
        "Validation pass complete"
    );

    ValidationReport { warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RawRecord, RawSection};

    #[test]
    fn test_default_policy() {
        let policy = ValidationPolicy::default();
        assert_eq!(policy.placeholder_markers, vec!["Write the rule".to_string()]);
        assert!(!policy.strict);
    }

    #[test]
    fn test_placeholder_marker_matching() {
        let policy = ValidationPolicy::default();
        assert_eq!(policy.placeholder_marker("Write the rule"), Some("Write the rule"));
        assert_eq!(policy.placeholder_marker("  write THE rule\n"), Some("Write the rule"));
        assert_eq!(policy.placeholder_marker("Write the rule for forms"), None);
    }

    #[test]
    fn test_validate_flags_incomplete_records() {
        let registry = Registry::build(
            [
                RawRecord::new("empty", "Empty").with_tag("UI"),
                RawRecord::new("placeholder", "Placeholder")
                    .with_tag("UI")
                    .with_content("Write the rule"),
                RawRecord::new("loose", "Loose").with_content("# Real rule"),
                RawRecord::new("done", "Done").with_tag("UI").with_content("# Real rule"),
            ],
            [RawSection::new("Official", ["empty", "placeholder", "done"])],
        )
        .unwrap();

        let report = registry.validate(&ValidationPolicy::default());
        assert_eq!(
            report.warnings(),
            &[
                ValidationWarning::EmptyContent {
                    slug: "empty".to_string()
                },
                ValidationWarning::PlaceholderContent {
                    slug: "placeholder".to_string(),
                    marker: "Write the rule".to_string()
                },
                ValidationWarning::Untagged {
                    slug: "loose".to_string()
                },
                ValidationWarning::Unsectioned {
                    slug: "loose".to_string()
                },
            ]
        );
        assert_eq!(report.for_slug("loose").count(), 2);
        assert_eq!(report.for_slug("done").count(), 0);
    }

    #[test]
    fn test_unsectioned_only_when_sections_exist() {
        let registry = Registry::build(
            [RawRecord::new("done", "Done").with_tag("UI").with_content("body")],
            Vec::<RawSection>::new(),
        )
        .unwrap();
        assert!(registry.validate(&ValidationPolicy::default()).is_clean());
    }
}
