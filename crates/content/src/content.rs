//! Content record with atomic popularity and update timestamp.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::id::ContentId;

const ORD: Ordering = Ordering::Relaxed;

/// One ranked item, shared between the registry and any ranking.
///
/// Fields are atomics so live handles can be read without locking. Scores change only
/// through a ranking, which refiles the record under its write lock; the raw mutators
/// are hidden from the public API for that reason.
#[derive(Debug)]
pub struct Content {
    id: ContentId,
    popularity: AtomicU64,
    /// Milliseconds since the Unix epoch.
    last_updated: AtomicU64,
}

impl Content {
    pub fn new(id: ContentId) -> Self {
        Self::with_popularity(id, 0)
    }

    /// Record with an initial score; the timestamp starts at zero (never updated).
    pub fn with_popularity(id: ContentId, popularity: u64) -> Self {
        Self {
            id,
            popularity: AtomicU64::new(popularity),
            last_updated: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> ContentId {
        self.id
    }

    pub fn popularity(&self) -> u64 {
        self.popularity.load(ORD)
    }

    pub fn last_updated(&self) -> u64 {
        self.last_updated.load(ORD)
    }

    /// Add `amount` (saturating) and stamp `now`. Returns the new popularity.
    ///
    /// The caller must hold the exclusive lock of the index filing this record and
    /// reposition it before releasing.
    #[doc(hidden)]
    pub fn increase(&self, amount: u64, now: u64) -> u64 {
        let previous = self
            .popularity
            .fetch_update(ORD, ORD, |p| Some(p.saturating_add(amount)))
            .unwrap_or_else(|p| p);
        self.last_updated.store(now, ORD);
        previous.saturating_add(amount)
    }

    /// Subtract `amount` with a floor at zero and stamp `now`. Returns the new popularity.
    ///
    /// Same locking contract as [`increase`](Self::increase).
    #[doc(hidden)]
    pub fn decrease(&self, amount: u64, now: u64) -> u64 {
        let previous = self
            .popularity
            .fetch_update(ORD, ORD, |p| Some(p.saturating_sub(amount)))
            .unwrap_or_else(|p| p);
        self.last_updated.store(now, ORD);
        previous.saturating_sub(amount)
    }

    pub fn snapshot(&self) -> ContentSnapshot {
        ContentSnapshot {
            id: self.id,
            popularity: self.popularity(),
            last_updated: self.last_updated(),
        }
    }
}

/// Point-in-time copy of a [`Content`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub id: ContentId,
    pub popularity: u64,
    pub last_updated: u64,
}
