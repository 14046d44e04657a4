//! Ranking events and non-blocking broadcast emitter.

use popularity_content::ContentId;
use tokio::sync::broadcast;

use crate::config::DEFAULT_EVENT_CHANNEL_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingEvent {
    /// An action was applied and the record repositioned.
    Updated {
        id: ContentId,
        previous: u64,
        current: u64,
    },
    /// An action targeted an id the resolver does not know; it was dropped.
    Unresolved { id: ContentId },
    /// The top-ranked record changed.
    LeaderChanged {
        previous: Option<ContentId>,
        current: ContentId,
    },
}

impl RankingEvent {
    pub fn content_id(&self) -> ContentId {
        match self {
            Self::Updated { id, .. } | Self::Unresolved { id } => *id,
            Self::LeaderChanged { current, .. } => *current,
        }
    }
}

/// Non-blocking broadcast emitter. Slow subscribers drop events independently.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<RankingEvent>,
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn emit(&self, event: RankingEvent) {
        // No receivers is not an error.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RankingEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn updated(&self, id: ContentId, previous: u64, current: u64) {
        self.emit(RankingEvent::Updated {
            id,
            previous,
            current,
        });
    }

    pub fn unresolved(&self, id: ContentId) {
        self.emit(RankingEvent::Unresolved { id });
    }

    pub fn leader_changed(&self, previous: Option<ContentId>, current: ContentId) {
        self.emit(RankingEvent::LeaderChanged { previous, current });
    }
}
