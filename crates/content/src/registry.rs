//! Identity-indexed content store backed by a sharded concurrent map.

use std::sync::Arc;

use auto_impl::auto_impl;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace};

use crate::content::{Content, ContentSnapshot};
use crate::error::RegistryError;
use crate::id::ContentId;

/// Resolves a content identity to its shared record.
#[auto_impl(&, Arc, Box)]
pub trait ContentResolver: Send + Sync {
    /// `None` for unknown ids; callers treat that as ignorable.
    fn resolve(&self, id: &ContentId) -> Option<Arc<Content>>;
}

/// Owns the canonical `Arc<Content>` for every registered id.
///
/// Lookups and first-time registrations are safe from any number of threads.
#[derive(Debug, Default)]
pub struct ContentRegistry {
    contents: DashMap<ContentId, Arc<Content>>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new record. An id that is already present is rejected and the
    /// existing record is left untouched.
    pub fn register(&self, content: Content) -> Result<Arc<Content>, RegistryError> {
        let id = content.id();
        match self.contents.entry(id) {
            Entry::Occupied(_) => {
                trace!(%id, "rejected duplicate registration");
                Err(RegistryError::AlreadyRegistered(id))
            }
            Entry::Vacant(slot) => {
                let content = Arc::new(content);
                slot.insert(Arc::clone(&content));
                debug!(%id, popularity = content.popularity(), "content registered");
                Ok(content)
            }
        }
    }

    pub fn lookup(&self, id: &ContentId) -> Option<Arc<Content>> {
        self.contents.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.contents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn ids(&self) -> Vec<ContentId> {
        self.contents.iter().map(|entry| *entry.key()).collect()
    }

    pub fn snapshots(&self) -> Vec<ContentSnapshot> {
        self.contents
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect()
    }
}

impl ContentResolver for ContentRegistry {
    fn resolve(&self, id: &ContentId) -> Option<Arc<Content>> {
        self.lookup(id)
    }
}
