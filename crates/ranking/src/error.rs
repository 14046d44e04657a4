use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Amounts must be strictly positive; the direction comes from the action kind.
    #[error("action amount must be positive, got {0}")]
    InvalidAmount(i64),
}
