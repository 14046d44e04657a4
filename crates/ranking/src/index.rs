//! Ordered index of record handles keyed by their filed [`RankKey`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};

use popularity_content::{Content, ContentId};

use crate::key::RankKey;

/// `order` and `positions` always hold the same set of ids. Not synchronized; the
/// ranking wraps it in a lock.
#[derive(Debug, Default)]
pub(crate) struct RankIndex {
    order: BTreeMap<RankKey, Weak<Content>>,
    /// Key each record is currently filed under.
    positions: HashMap<ContentId, RankKey>,
}

impl RankIndex {
    /// Remove the record's previous entry (if any) and file it under `key`.
    /// Returns the previous key.
    pub(crate) fn reposition(&mut self, content: &Arc<Content>, key: RankKey) -> Option<RankKey> {
        debug_assert_eq!(content.id(), key.id());

        let previous = self.positions.insert(key.id(), key);
        if let Some(previous) = previous {
            self.order.remove(&previous);
        }
        self.order.insert(key, Arc::downgrade(content));
        previous
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &RankKey> {
        self.order.keys()
    }

    pub(crate) fn handles(&self) -> impl Iterator<Item = &Weak<Content>> {
        self.order.values()
    }

    pub(crate) fn leader(&self) -> Option<ContentId> {
        self.order.keys().next().map(RankKey::id)
    }

    pub(crate) fn get(&self, id: &ContentId) -> Option<RankKey> {
        self.positions.get(id).copied()
    }

    /// 0-based rank. Linear in the rank itself.
    pub(crate) fn position(&self, id: &ContentId) -> Option<usize> {
        let key = self.positions.get(id)?;
        Some(self.order.range(..key).count())
    }

    pub(crate) fn contains(&self, id: &ContentId) -> bool {
        self.positions.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}
