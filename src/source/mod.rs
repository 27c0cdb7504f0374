//! Content sources: YAML/JSON files holding raw records and sections.
//!
//! A source is a list of patterns. Each pattern may be a file, a directory
//! (its direct `.yaml`/`.yml`/`.json` children) or a glob. Existing files
//! and directories are matched by name, never as glob patterns. Matched files are
//! read in pattern order, sorted within each pattern, and concatenated.
//!
//! # Document shape
//!
//! ```yaml
//! records:
//!   - slug: nextjs
//!     title: Next.js
//!     tags: [Next.js, React, Typescript]
//!     content: |
//!       # Next.js rules
//! sections:
//!   - tag: Official
//!     recordSlugs: [nextjs]
//! ```
//!
//! A top-level array is read as a list of sections whose `rules` embed
//! full records, the shape the rule collections were first published in.

pub mod watcher;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::domain::{RawRecord, RawSection};
use crate::error::{RegistryError, SourceError};
use crate::registry::Registry;

pub use watcher::{ReloadEvent, SourceWatcher, WatchHandle};

/// Supported file formats, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Some(Self::Yaml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// Raw definitions read from one or more files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    #[serde(default)]
    pub records: Vec<RawRecord>,

    #[serde(default)]
    pub sections: Vec<RawSection>,
}

impl SourceDocument {
    /// Parse one document; `path` is only used for error messages
    pub fn parse(text: &str, format: SourceFormat, path: &Path) -> Result<Self, SourceError> {
        let parse_err = |message: String| SourceError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match format {
            SourceFormat::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?;
                match value {
                    serde_json::Value::Null => Ok(Self::default()),
                    serde_json::Value::Array(_) => serde_json::from_value(value)
                        .map(Self::from_sections)
                        .map_err(|e| parse_err(e.to_string())),
                    _ => serde_json::from_value(value).map_err(|e| parse_err(e.to_string())),
                }
            }
            SourceFormat::Yaml => {
                let value: serde_yaml::Value =
                    serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?;
                match value {
                    serde_yaml::Value::Null => Ok(Self::default()),
                    serde_yaml::Value::Sequence(_) => serde_yaml::from_value(value)
                        .map(Self::from_sections)
                        .map_err(|e| parse_err(e.to_string())),
                    _ => serde_yaml::from_value(value).map_err(|e| parse_err(e.to_string())),
                }
            }
        }
    }

    fn from_sections(sections: Vec<RawSection>) -> Self {
        Self {
            records: Vec::new(),
            sections,
        }
    }

    /// Append another document's definitions after this one's
    pub fn merge(&mut self, other: SourceDocument) {
        self.records.extend(other.records);
        self.sections.extend(other.sections);
    }

    /// Validate and index the collected definitions
    pub fn into_registry(self) -> Result<Registry, RegistryError> {
        Registry::build(self.records, self.sections)
    }
}

/// Where raw content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSource {
    patterns: Vec<String>,
}

impl ContentSource {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Source reading a single file or directory
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new([path.as_ref().to_string_lossy().into_owned()])
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Expand patterns into the ordered list of files to read
    pub fn resolve(&self) -> Result<Vec<PathBuf>, SourceError> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for pattern in &self.patterns {
            let as_path = Path::new(pattern);

            // Existing paths are taken literally so glob metacharacters in
            // their names don't turn them into patterns.
            if as_path.is_file() {
                let path = as_path.to_path_buf();
                if seen.insert(path.clone()) {
                    files.push(path);
                }
                continue;
            }

            let glob_pattern = if as_path.is_dir() {
                Path::new(&glob::Pattern::escape(pattern))
                    .join("*")
                    .to_string_lossy()
                    .into_owned()
            } else {
                pattern.clone()
            };

            let entries = glob::glob(&glob_pattern).map_err(|source| SourceError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;

            let mut matched = Vec::new();
            for entry in entries {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    SourceError::Io {
                        path,
                        source: e.into(),
                    }
                })?;
                if path.is_file() && SourceFormat::from_path(&path).is_some() {
                    matched.push(path);
                }
            }
            matched.sort();

            debug!("Pattern {} matched {} file(s)", pattern, matched.len());
            files.extend(matched.into_iter().filter(|p| seen.insert(p.clone())));
        }

        if files.is_empty() {
            return Err(SourceError::NoSources(self.patterns.join(", ")));
        }

        Ok(files)
    }

    /// Read and parse every matched file
    pub async fn load(&self) -> Result<SourceDocument, SourceError> {
        let files = self.resolve()?;
        let mut document = SourceDocument::default();

        for path in &files {
            document.merge(load_file(path).await?);
        }

        info!(
            "Loaded {} record(s) and {} section(s) from {} file(s)",
            document.records.len(),
            document.sections.len(),
            files.len()
        );

        Ok(document)
    }

    /// Read every matched file and build a registry from the result
    pub async fn load_registry(&self) -> Result<Registry, SourceError> {
        Ok(self.load().await?.into_registry()?)
    }
}

/// Read and parse one source file
pub async fn load_file(path: &Path) -> Result<SourceDocument, SourceError> {
    let format = SourceFormat::from_path(path)
        .ok_or_else(|| SourceError::UnsupportedFormat(path.to_path_buf()))?;

    let text = fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    SourceDocument::parse(&text, format, path)
}
