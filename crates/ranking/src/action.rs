//! Score-adjustment requests.

use std::num::NonZeroU64;

use popularity_content::ContentId;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ActionError;

/// Direction of a score adjustment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Increase,
    Decrease,
}

/// One requested adjustment of a content item's popularity.
///
/// The amount is always positive. Construction rejects zero and negative amounts
/// instead of clamping them, so a caller can never silently invert its intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAction")]
pub struct ContentAction {
    content_id: ContentId,
    kind: ActionKind,
    amount: NonZeroU64,
}

impl ContentAction {
    pub fn new(content_id: ContentId, kind: ActionKind, amount: i64) -> Result<Self, ActionError> {
        let amount = u64::try_from(amount)
            .ok()
            .and_then(NonZeroU64::new)
            .ok_or(ActionError::InvalidAmount(amount))?;
        Ok(Self::with_amount(content_id, kind, amount))
    }

    pub fn with_amount(content_id: ContentId, kind: ActionKind, amount: NonZeroU64) -> Self {
        Self {
            content_id,
            kind,
            amount,
        }
    }

    /// Increase by one.
    pub fn increase(content_id: ContentId) -> Self {
        Self::with_amount(content_id, ActionKind::Increase, NonZeroU64::MIN)
    }

    /// Decrease by one.
    pub fn decrease(content_id: ContentId) -> Self {
        Self::with_amount(content_id, ActionKind::Decrease, NonZeroU64::MIN)
    }

    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn amount(&self) -> u64 {
        self.amount.get()
    }
}

/// Wire shape of an action before validation. `amount` defaults to 1.
#[derive(Deserialize)]
struct RawAction {
    content_id: ContentId,
    kind: ActionKind,
    #[serde(default = "default_amount")]
    amount: i64,
}

fn default_amount() -> i64 {
    1
}

impl TryFrom<RawAction> for ContentAction {
    type Error = ActionError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        Self::new(raw.content_id, raw.kind, raw.amount)
    }
}
