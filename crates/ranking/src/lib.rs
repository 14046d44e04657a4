//! Live popularity ranking over shared content records.
//!
//! [`PopularityRanking`] consumes [`ContentAction`]s, resolves each target through a
//! [`ContentResolver`](popularity_content::ContentResolver), mutates the record and
//! repositions it in an ordered index under a single write lock. Top-N queries take the
//! shared read lock and never observe a record mid-move.

pub mod action;
pub mod config;
pub mod error;
pub mod events;
mod index;
pub mod key;
pub mod ranking;

pub use action::{ActionKind, ContentAction};
pub use config::RankingConfig;
pub use error::ActionError;
pub use events::{EventEmitter, RankingEvent};
pub use key::RankKey;
pub use ranking::{ApplySummary, PopularityRanking};
