//! Domain types for the content registry.
//!
//! - Raw: loosely-typed definitions as supplied by a content source
//! - Record: validated content entries
//! - Section: named groupings of records by slug
//! - Slug: URL-safe record identifiers

pub mod raw;
pub mod record;
pub mod section;
pub mod slug;

pub use raw::{RawAuthor, RawRecord, RawSection, SectionEntry};
pub use record::{is_well_formed_uri, Author, ContentRecord};
pub use section::ContentSection;
pub use slug::Slug;
