//! Error types for registry construction and content loading.
//!
//! Construction errors are fatal to the build attempt that raised them: the
//! caller gets either a complete [`Registry`](crate::Registry) or one of
//! these values, never a partially indexed registry.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),

    #[error("Section '{section}' references unknown slug: {slug}")]
    UnknownSlugInSection { section: String, slug: String },

    #[error("Invalid record{}: {reason}", display_slug(.slug))]
    InvalidRecord {
        slug: Option<String>,
        reason: String,
    },

    #[error("Duplicate section: {0}")]
    DuplicateSection(String),

    #[error("Section '{section}' lists slug more than once: {slug}")]
    DuplicateSlugInSection { section: String, slug: String },

    #[error("Invalid section{}: {reason}", display_slug(.section))]
    InvalidSection {
        section: Option<String>,
        reason: String,
    },

    /// Lookup miss. Only produced by [`Registry::require`](crate::Registry::require).
    #[error("Not found: {0}")]
    NotFound(String),
}

impl RegistryError {
    /// Create an invalid record error
    pub fn invalid_record(slug: Option<&str>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            slug: slug.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Create an invalid section error
    pub fn invalid_section(section: Option<&str>, reason: impl Into<String>) -> Self {
        Self::InvalidSection {
            section: section.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts registry construction
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

fn display_slug(value: &Option<String>) -> String {
    match value {
        Some(v) => format!(" '{}'", v),
        None => String::new(),
    }
}

/// Errors raised while reading content sources
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid source pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("No content sources matched: {0}")]
    NoSources(String),

    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
