//! Composite order key for the ranking.

use std::cmp::Ordering;

use popularity_content::{ContentId, ContentSnapshot};

/// Snapshot of a record's order key at the moment it was filed.
///
/// Sorts best-first: higher popularity, then more recent update, then lower id. The id
/// term makes every key unique per record, so two records with equal score and
/// timestamp are still two entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankKey {
    popularity: u64,
    last_updated: u64,
    id: ContentId,
}

impl RankKey {
    pub fn new(id: ContentId, popularity: u64, last_updated: u64) -> Self {
        Self {
            popularity,
            last_updated,
            id,
        }
    }

    pub fn id(&self) -> ContentId {
        self.id
    }

    pub fn popularity(&self) -> u64 {
        self.popularity
    }

    pub fn last_updated(&self) -> u64 {
        self.last_updated
    }

    pub fn snapshot(&self) -> ContentSnapshot {
        ContentSnapshot {
            id: self.id,
            popularity: self.popularity,
            last_updated: self.last_updated,
        }
    }
}

impl From<ContentSnapshot> for RankKey {
    fn from(snapshot: ContentSnapshot) -> Self {
        Self::new(snapshot.id, snapshot.popularity, snapshot.last_updated)
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher popularity first
        other
            .popularity
            .cmp(&self.popularity)
            // Then more recently updated first
            .then_with(|| other.last_updated.cmp(&self.last_updated))
            .then_with(|| self.id.cmp(&other.id))
    }
}
