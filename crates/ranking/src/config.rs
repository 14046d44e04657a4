//! Ranking configuration (TOML-serializable).

use serde::{Deserialize, Serialize};

/// Default leaderboard size for callers that do not pick one.
pub const DEFAULT_TOP_N: usize = 10;

/// Default broadcast channel capacity for ranking events.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Leaderboard size used by [`PopularityRanking::leaderboard`](crate::PopularityRanking::leaderboard).
    pub top_n: usize,
    /// Broadcast channel capacity for ranking events.
    pub event_channel_capacity: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}
