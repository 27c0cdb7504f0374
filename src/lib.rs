//! rulebook - Immutable content registry for rule documents
//!
//! Holds tagged, authored content records grouped into named sections and
//! answers read-only queries over them.
//!
//! # Architecture
//!
//! The registry is built once and never mutated:
//! - Raw definitions are validated at the boundary into uniform records
//! - Construction is all-or-nothing; any invalid definition aborts it
//! - Reloading builds a fresh registry and swaps a shared pointer
//!
//! # Modules
//!
//! - `domain`: Data structures (ContentRecord, ContentSection, Slug, raw input)
//! - `registry`: Indexing, queries, search ranking, validation, hot swap
//! - `source`: YAML/JSON content loading and file watching
//! - `config`: Config file and environment resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Look up a rule
//! rulebook show nextjs
//!
//! # Search titles and tags
//! rulebook search next
//!
//! # Flag placeholder content
//! rulebook validate --strict
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod registry;
pub mod source;

// Re-export main types at crate root for convenience
pub use domain::{Author, ContentRecord, ContentSection, RawAuthor, RawRecord, RawSection, Slug};
pub use error::{RegistryError, SourceError};
pub use registry::{
    MatchRank, Registry, RegistryBuilder, SearchHit, SharedRegistry, ValidationPolicy,
    ValidationReport, ValidationWarning,
};
pub use source::{ContentSource, SourceDocument};
