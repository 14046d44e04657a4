//! Popularity ranking with remove-then-reinsert repositioning under one lock.

use std::pin::pin;
use std::sync::{Arc, Weak};

use futures::{Stream, StreamExt};
use parking_lot::RwLock;
use popularity_content::{
    Clock, Content, ContentId, ContentRegistry, ContentResolver, ContentSnapshot, SystemClock,
};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::action::{ActionKind, ContentAction};
use crate::config::RankingConfig;
use crate::events::{EventEmitter, RankingEvent};
use crate::index::RankIndex;
use crate::key::RankKey;

/// Outcome counts of a batch or stream of actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Actions whose content resolved and was repositioned.
    pub applied: usize,
    /// Actions dropped because their content id was unknown.
    pub skipped: usize,
}

impl ApplySummary {
    pub fn total(&self) -> usize {
        self.applied + self.skipped
    }

    fn record(&mut self, applied: bool) {
        if applied {
            self.applied += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Live ranking of content records by (popularity desc, last update desc, id asc).
///
/// Records enter the ranking on the first action that targets them. Every action takes
/// the write lock, mutates the record, refiles it and emits its events before
/// releasing, so `top_n` and `top1` (shared read lock) only ever see a consistent order
/// and subscribers receive events in the order the ranking changed. Queries may run
/// concurrently with each other.
///
/// The registry owns the records; the ranking keeps `Weak` handles plus the key each
/// record is filed under.
pub struct PopularityRanking<R: ContentResolver = Arc<ContentRegistry>, C: Clock = SystemClock> {
    config: RankingConfig,
    resolver: R,
    clock: C,
    index: RwLock<RankIndex>,
    events: EventEmitter,
}

impl<R: ContentResolver> PopularityRanking<R, SystemClock> {
    pub fn new(resolver: R) -> Self {
        Self::with_config(resolver, RankingConfig::default())
    }

    pub fn with_config(resolver: R, config: RankingConfig) -> Self {
        Self::with_clock(resolver, SystemClock, config)
    }
}

impl<R: ContentResolver, C: Clock> PopularityRanking<R, C> {
    pub fn with_clock(resolver: R, clock: C, config: RankingConfig) -> Self {
        Self {
            events: EventEmitter::new(config.event_channel_capacity),
            config,
            resolver,
            clock,
            index: RwLock::new(RankIndex::default()),
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Apply one action. Returns the record's new filed snapshot, or `None` if the
    /// content id is unknown (the action is dropped without effect).
    pub fn apply(&self, action: &ContentAction) -> Option<ContentSnapshot> {
        let id = action.content_id();
        let Some(content) = self.resolver.resolve(&id) else {
            trace!(%id, kind = %action.kind(), "skipping action for unknown content");
            self.events.unresolved(id);
            return None;
        };

        let mut index = self.index.write();
        let leader_before = index.leader();

        let previous = content.popularity();
        let now = self.clock.now_millis();
        let popularity = match action.kind() {
            ActionKind::Increase => content.increase(action.amount(), now),
            ActionKind::Decrease => content.decrease(action.amount(), now),
        };

        let key = RankKey::new(id, popularity, now);
        if index.reposition(&content, key).is_none() {
            trace!(%id, "content entered ranking");
        }

        trace!(
            %id,
            kind = %action.kind(),
            amount = action.amount(),
            previous,
            current = popularity,
            "action applied"
        );

        // Emitted under the write lock so subscribers see events in ranking order.
        self.events.updated(id, previous, popularity);
        if let Some(current_leader) = index.leader()
            && leader_before != Some(current_leader)
        {
            debug!(previous_leader = ?leader_before, %current_leader, "ranking leader changed");
            self.events.leader_changed(leader_before, current_leader);
        }
        drop(index);

        Some(key.snapshot())
    }

    /// Apply actions in sequence order. The iterator is consumed lazily, so unbounded
    /// sources are processed as they produce.
    pub fn apply_actions<I>(&self, actions: I) -> ApplySummary
    where
        I: IntoIterator<Item = ContentAction>,
    {
        let mut summary = ApplySummary::default();
        for action in actions {
            summary.record(self.apply(&action).is_some());
        }
        debug!(applied = summary.applied, skipped = summary.skipped, "applied actions");
        summary
    }

    /// Streaming variant of [`apply_actions`](Self::apply_actions): each action is
    /// applied as it arrives. Resolves once the stream ends.
    pub async fn consume<S>(&self, actions: S) -> ApplySummary
    where
        S: Stream<Item = ContentAction>,
    {
        let mut actions = pin!(actions);
        let mut summary = ApplySummary::default();
        while let Some(action) = actions.next().await {
            summary.record(self.apply(&action).is_some());
        }
        debug!(applied = summary.applied, skipped = summary.skipped, "action stream ended");
        summary
    }

    /// Up to `n` snapshots, best first.
    pub fn top_n(&self, n: usize) -> Vec<ContentSnapshot> {
        self.index
            .read()
            .keys()
            .take(n)
            .map(RankKey::snapshot)
            .collect()
    }

    pub fn top1(&self) -> Option<ContentSnapshot> {
        self.index.read().keys().next().map(RankKey::snapshot)
    }

    /// `top_n` with the configured leaderboard size.
    pub fn leaderboard(&self) -> Vec<ContentSnapshot> {
        self.top_n(self.config.top_n)
    }

    /// Live handles to the best `n` records. Their values may move on after return.
    pub fn leaders(&self, n: usize) -> Vec<Arc<Content>> {
        self.index
            .read()
            .handles()
            .take(n)
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// 0-based rank of a record, `None` if it has never been acted on.
    pub fn position(&self, id: &ContentId) -> Option<usize> {
        self.index.read().position(id)
    }

    /// The snapshot a record is currently filed under.
    pub fn ranked(&self, id: &ContentId) -> Option<ContentSnapshot> {
        self.index.read().get(id).map(|key| key.snapshot())
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.index.read().contains(id)
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RankingEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use popularity_content::ManualClock;

    use super::*;

    fn id(n: u64) -> ContentId {
        ContentId::new(n)
    }

    fn inc(n: u64, amount: i64) -> ContentAction {
        ContentAction::new(id(n), ActionKind::Increase, amount).unwrap()
    }

    fn dec(n: u64, amount: i64) -> ContentAction {
        ContentAction::new(id(n), ActionKind::Decrease, amount).unwrap()
    }

    fn ids(snapshots: &[ContentSnapshot]) -> Vec<u64> {
        snapshots.iter().map(|s| s.id.get()).collect()
    }

    type TestRanking = PopularityRanking<Arc<ContentRegistry>, Arc<ManualClock>>;

    fn setup(contents: &[u64]) -> (Arc<ContentRegistry>, Arc<ManualClock>, TestRanking) {
        let registry = Arc::new(ContentRegistry::new());
        for n in contents {
            registry.register(Content::new(id(*n))).unwrap();
        }
        let clock = Arc::new(ManualClock::new(1_000));
        let ranking = PopularityRanking::with_clock(
            Arc::clone(&registry),
            Arc::clone(&clock),
            RankingConfig::default(),
        );
        (registry, clock, ranking)
    }

    #[test]
    fn test_scenario_increase_then_decrease() {
        let (_registry, clock, ranking) = setup(&[1, 2]);

        clock.advance(1);
        ranking.apply(&inc(1, 5));
        clock.advance(1);
        ranking.apply(&inc(2, 3));
        assert_eq!(ids(&ranking.top_n(2)), vec![1, 2]);

        clock.advance(1);
        let a = ranking.apply(&dec(1, 10)).unwrap();
        assert_eq!(a.popularity, 0);
        assert_eq!(ids(&ranking.top_n(2)), vec![2, 1]);
    }

    #[test]
    fn test_unknown_content_is_noop() {
        let (registry, _clock, ranking) = setup(&[1]);
        ranking.apply(&inc(1, 2));
        let before = ranking.top_n(10);

        assert!(ranking.apply(&inc(99, 1)).is_none());
        let summary = ranking.apply_actions([dec(99, 4), inc(99, 1)]);
        assert_eq!(
            summary,
            ApplySummary {
                applied: 0,
                skipped: 2
            }
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(ranking.top_n(10), before);
        assert!(!ranking.contains(&id(99)));
    }

    #[test]
    fn test_top1_empty() {
        let (_registry, _clock, ranking) = setup(&[1, 2]);
        assert!(ranking.is_empty());
        assert!(ranking.top1().is_none());
        assert!(ranking.top_n(5).is_empty());
    }

    #[test]
    fn test_only_acted_content_is_ranked() {
        let (registry, _clock, ranking) = setup(&[1, 2, 3]);
        ranking.apply(&inc(2, 1));

        assert_eq!(registry.len(), 3);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ids(&ranking.top_n(3)), vec![2]);
    }

    #[test]
    fn test_first_action_may_be_decrease() {
        let (registry, _clock, ranking) = setup(&[]);
        registry
            .register(Content::with_popularity(id(7), 4))
            .unwrap();

        let snapshot = ranking.apply(&dec(7, 1)).unwrap();
        assert_eq!(snapshot.popularity, 3);
        assert_eq!(ranking.top1().map(|s| s.id), Some(id(7)));
    }

    #[test]
    fn test_decrease_pins_at_zero() {
        let (registry, _clock, ranking) = setup(&[1]);
        ranking.apply_actions([inc(1, 2), dec(1, 5), dec(1, 1), dec(1, i64::MAX)]);

        assert_eq!(registry.lookup(&id(1)).unwrap().popularity(), 0);
        assert_eq!(ranking.top1().unwrap().popularity, 0);
    }

    #[test]
    fn test_recency_breaks_ties() {
        let (_registry, clock, ranking) = setup(&[1, 2]);

        clock.set(10);
        ranking.apply(&inc(1, 3));
        clock.set(20);
        ranking.apply(&inc(2, 3));
        assert_eq!(ids(&ranking.top_n(2)), vec![2, 1]);

        // Touching 1 again at the same score makes it the most recent.
        clock.set(30);
        ranking.apply_actions([inc(1, 1), dec(1, 1)]);
        assert_eq!(ids(&ranking.top_n(2)), vec![1, 2]);
    }

    #[test]
    fn test_identical_keys_keep_both_records() {
        let (_registry, clock, ranking) = setup(&[1, 2]);
        clock.set(50);
        ranking.apply_actions([inc(2, 4), inc(1, 4)]);

        let top = ranking.top_n(10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].popularity, top[1].popularity);
        assert_eq!(top[0].last_updated, top[1].last_updated);
        assert_eq!(ids(&top), vec![1, 2]);
    }

    #[test]
    fn test_top_n_bounds() {
        let (_registry, clock, ranking) = setup(&[1, 2, 3]);
        for n in 1..=3 {
            clock.advance(1);
            ranking.apply(&inc(n, n as i64));
        }

        assert_eq!(ranking.top_n(0).len(), 0);
        assert_eq!(ids(&ranking.top_n(2)), vec![3, 2]);
        assert_eq!(ids(&ranking.top_n(100)), vec![3, 2, 1]);
        assert_eq!(ranking.top1().map(|s| s.id), Some(id(3)));
    }

    #[test]
    fn test_position_and_ranked() {
        let (_registry, clock, ranking) = setup(&[1, 2, 3]);
        clock.set(5);
        ranking.apply_actions([inc(1, 1), inc(2, 9), inc(3, 4)]);

        assert_eq!(ranking.position(&id(2)), Some(0));
        assert_eq!(ranking.position(&id(3)), Some(1));
        assert_eq!(ranking.position(&id(1)), Some(2));
        assert_eq!(ranking.position(&id(4)), None);

        let ranked = ranking.ranked(&id(3)).unwrap();
        assert_eq!(ranked.popularity, 4);
        assert_eq!(ranked.last_updated, 5);
    }

    #[test]
    fn test_leaders_are_live_records() {
        let (registry, _clock, ranking) = setup(&[1, 2]);
        ranking.apply_actions([inc(1, 1), inc(2, 2)]);

        let leaders = ranking.leaders(1);
        assert_eq!(leaders.len(), 1);
        assert!(Arc::ptr_eq(&leaders[0], &registry.lookup(&id(2)).unwrap()));
    }

    #[test]
    fn test_leaderboard_uses_config() {
        let registry = Arc::new(ContentRegistry::new());
        for n in 1..=5 {
            registry.register(Content::new(id(n))).unwrap();
        }
        let config = RankingConfig {
            top_n: 2,
            ..Default::default()
        };
        let ranking = PopularityRanking::with_config(Arc::clone(&registry), config);
        ranking.apply_actions((1..=5).map(|n| inc(n, n as i64)));

        assert_eq!(ids(&ranking.leaderboard()), vec![5, 4]);
    }

    #[tokio::test]
    async fn test_events() {
        let (_registry, clock, ranking) = setup(&[1, 2]);
        let mut rx = ranking.subscribe();

        clock.advance(1);
        ranking.apply(&inc(1, 2));
        ranking.apply(&inc(99, 1));
        clock.advance(1);
        ranking.apply(&inc(2, 5));

        let expected = [
            RankingEvent::Updated {
                id: id(1),
                previous: 0,
                current: 2,
            },
            RankingEvent::LeaderChanged {
                previous: None,
                current: id(1),
            },
            RankingEvent::Unresolved { id: id(99) },
            RankingEvent::Updated {
                id: id(2),
                previous: 0,
                current: 5,
            },
            RankingEvent::LeaderChanged {
                previous: Some(id(1)),
                current: id(2),
            },
        ];
        for event in expected {
            assert_eq!(rx.recv().await.unwrap(), event);
        }
    }

    #[test]
    fn test_concurrent_events_follow_ranking_history() {
        let registry = Arc::new(ContentRegistry::new());
        for n in 0..4 {
            registry.register(Content::new(id(n))).unwrap();
        }
        let config = RankingConfig {
            event_channel_capacity: 1 << 16,
            ..Default::default()
        };
        let ranking = Arc::new(PopularityRanking::with_config(Arc::clone(&registry), config));
        let mut rx = ranking.subscribe();

        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let ranking = Arc::clone(&ranking);
                thread::spawn(move || {
                    for i in 0..300u64 {
                        let n = (t + i) % 4;
                        let action = if (t + i) % 3 == 0 { dec(n, 2) } else { inc(n, 1) };
                        ranking.apply(&action);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Replaying the events must reproduce the ranking's final state.
        let mut leader = None;
        let mut scores = std::collections::HashMap::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                RankingEvent::LeaderChanged { previous, current } => {
                    assert_eq!(previous, leader);
                    leader = Some(current);
                }
                RankingEvent::Updated {
                    id,
                    previous,
                    current,
                } => {
                    assert_eq!(previous, scores.get(&id).copied().unwrap_or(0));
                    scores.insert(id, current);
                }
                RankingEvent::Unresolved { .. } => unreachable!(),
            }
        }

        assert_eq!(leader, ranking.top1().map(|s| s.id));
        for (content_id, score) in scores {
            assert_eq!(registry.lookup(&content_id).unwrap().popularity(), score);
        }
    }

    #[tokio::test]
    async fn test_consume_stream() {
        let (_registry, _clock, ranking) = setup(&[1, 2]);
        let actions = futures::stream::iter(vec![inc(1, 1), inc(2, 3), inc(42, 1), dec(2, 1)]);

        let summary = ranking.consume(actions).await;
        assert_eq!(
            summary,
            ApplySummary {
                applied: 3,
                skipped: 1
            }
        );
        assert_eq!(summary.total(), 4);
        assert_eq!(ranking.top1().map(|s| (s.id, s.popularity)), Some((id(2), 2)));
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let (registry, _clock, ranking) = setup(&(0..20).collect::<Vec<_>>());
        let ranking = Arc::new(ranking);
        let mut handles = vec![];

        for t in 0..4u64 {
            let ranking = Arc::clone(&ranking);
            handles.push(thread::spawn(move || {
                for i in 0..500u64 {
                    let n = (t * 7 + i) % 20;
                    let action = if i % 3 == 0 { dec(n, 2) } else { inc(n, 1) };
                    ranking.apply(&action);
                }
            }));
        }

        for _ in 0..2 {
            let ranking = Arc::clone(&ranking);
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    let top = ranking.top_n(20);
                    assert!(top.len() <= 20);
                    for pair in top.windows(2) {
                        assert!(RankKey::from(pair[0]) < RankKey::from(pair[1]));
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let top = ranking.top_n(100);
        assert_eq!(top.len(), ranking.len());
        assert!(ranking.len() <= registry.len());
        // Filed keys agree with the live records once writers are done.
        for snapshot in top {
            let live = registry.lookup(&snapshot.id).unwrap().snapshot();
            assert_eq!(live, snapshot);
        }
    }
}
