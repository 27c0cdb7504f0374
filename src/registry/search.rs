//! Case-insensitive substring search over titles and tags.
//!
//! Matches are ranked by tier, then by insertion order:
//!
//! 1. exact title match
//! 2. title prefix match
//! 3. exact tag match
//! 4. substring match in the title or any tag

use serde::Serialize;

use crate::domain::ContentRecord;

/// How a record matched a query. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRank {
    ExactTitle,
    TitlePrefix,
    ExactTag,
    Substring,
}

impl std::fmt::Display for MatchRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MatchRank::ExactTitle => "title",
            MatchRank::TitlePrefix => "prefix",
            MatchRank::ExactTag => "tag",
            MatchRank::Substring => "substring",
        };
        f.pad(label)
    }
}

/// A ranked search result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchHit<'a> {
    pub record: &'a ContentRecord,
    pub rank: MatchRank,
}

/// Lowercased title and tags, computed once at build time
#[derive(Debug, Clone)]
pub(crate) struct SearchKey {
    title: String,
    tags: Vec<String>,
}

impl SearchKey {
    pub(crate) fn new(record: &ContentRecord) -> Self {
        Self {
            title: record.title().to_lowercase(),
            tags: record.tags().iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Best tier this key reaches for an already-lowercased query
    fn rank(&self, query: &str) -> Option<MatchRank> {
        if self.title == query {
            Some(MatchRank::ExactTitle)
        } else if self.title.starts_with(query) {
            Some(MatchRank::TitlePrefix)
        } else if self.tags.iter().any(|t| t == query) {
            Some(MatchRank::ExactTag)
        } else if self.title.contains(query) || self.tags.iter().any(|t| t.contains(query)) {
            Some(MatchRank::Substring)
        } else {
            None
        }
    }
}

/// Rank every record against `query`
///
/// `records` and `keys` are parallel slices. A blank query matches nothing.
pub(crate) fn ranked<'a>(
    records: &'a [ContentRecord],
    keys: &[SearchKey],
    query: &str,
) -> Vec<SearchHit<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit<'a>> = records
        .iter()
        .zip(keys)
        .filter_map(|(record, key)| key.rank(&query).map(|rank| SearchHit { record, rank }))
        .collect();

    // Stable sort keeps insertion order within a tier
    hits.sort_by_key(|hit| hit.rank);
    hits
}
