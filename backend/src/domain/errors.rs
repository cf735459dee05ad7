use shared::LedgerEvent;
use thiserror::Error;

/// Failures of ledger commands. None of them leave the ledger inconsistent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The amount was not a positive, finite whole number
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Undo was requested with an empty history
    #[error("there is nothing to undo")]
    NoHistory,

    /// The store could not be written; the in-memory ledger is still correct
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl LedgerError {
    /// The notification the presentation layer shows for this failure
    pub fn to_event(&self) -> LedgerEvent {
        match self {
            LedgerError::InvalidAmount(_) => LedgerEvent::InvalidInput,
            LedgerError::NoHistory => LedgerEvent::NoHistory,
            LedgerError::PersistenceUnavailable(reason) => LedgerEvent::PersistenceFailed {
                reason: reason.clone(),
            },
        }
    }
}
