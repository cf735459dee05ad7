use serde::{Deserialize, Serialize};

/// One undo-stack entry as persisted and as returned by the history API.
///
/// Field names follow the stored JSON format: `{"debt": number, "date": number}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Balance captured before the operation
    pub debt: f64,
    /// Last accrual instant captured before the operation (epoch millis)
    pub date: i64,
}

/// Read model of the ledger for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerView {
    /// Authoritative balance, unrounded
    pub balance: f64,
    /// Balance rounded to whole units with thousands separators
    pub display_balance: String,
    /// Last accrual instant (epoch millis)
    pub last_accrual_timestamp: i64,
    /// Last accrual date rendered as local `YYYY/M/D`
    pub last_accrual_date: String,
    pub history_len: usize,
    /// Whether the undo command should be enabled
    pub can_undo: bool,
    /// Whether the payment command should be enabled (balance > 0)
    pub can_record_payment: bool,
    /// Whole days that would be charged if a transaction were recorded now
    pub pending_days: u64,
    /// Interest that would be charged if a transaction were recorded now
    pub pending_interest: f64,
}

/// Notifications emitted by ledger commands for rendering and animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Interest was charged for `days` elapsed days
    InterestAccrued { days: u64, amount: f64 },
    /// The balance moved; the display layer animates between the two values
    BalanceChanged { from: f64, to: f64 },
    /// Sent after every history push or pop to drive undo enablement
    HistoryAvailabilityChanged { has_entries: bool },
    /// A borrow of `amount` was added to the debt
    BorrowRecorded { amount: u64 },
    /// The previous state was restored
    UndoApplied { restored_timestamp: i64 },
    /// A payment was requested while nothing is owed; nothing changed
    PaymentIgnored,
    /// The amount was not a positive whole number
    InvalidInput,
    /// Undo was requested with an empty history
    NoHistory,
    /// The state changed in memory but could not be saved
    PersistenceFailed { reason: String },
}

impl LedgerEvent {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LedgerEvent::InvalidInput | LedgerEvent::NoHistory | LedgerEvent::PersistenceFailed { .. }
        )
    }
}

/// Request body for recording a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: f64,
}

/// Request body for recording a borrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordBorrowRequest {
    pub amount: f64,
}

/// Result of a successful command: the events it produced and the new view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub events: Vec<LedgerEvent>,
    pub ledger: LedgerView,
}

impl CommandOutcome {
    /// The balance transition to animate, if the command moved the balance
    pub fn balance_transition(&self) -> Option<(f64, f64)> {
        self.events.iter().find_map(|event| match event {
            LedgerEvent::BalanceChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
    }
}

/// Error body returned by the REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub event: LedgerEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_record_uses_stored_field_names() {
        let json = serde_json::to_string(&SnapshotRecord { debt: 100000.0, date: 1700000000000 }).unwrap();
        assert_eq!(json, r#"{"debt":100000.0,"date":1700000000000}"#);

        let parsed: SnapshotRecord = serde_json::from_str(r#"{"debt":95082.5,"date":42}"#).unwrap();
        assert_eq!(parsed, SnapshotRecord { debt: 95082.5, date: 42 });
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = LedgerEvent::InterestAccrued { days: 2, amount: 82.19 };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "interest_accrued");
        assert_eq!(value["days"], 2);

        let value = serde_json::to_value(LedgerEvent::NoHistory).unwrap();
        assert_eq!(value["type"], "no_history");
    }

    #[test]
    fn test_failure_classification() {
        assert!(LedgerEvent::InvalidInput.is_failure());
        assert!(LedgerEvent::NoHistory.is_failure());
        assert!(LedgerEvent::PersistenceFailed { reason: "disk full".to_string() }.is_failure());
        assert!(!LedgerEvent::PaymentIgnored.is_failure());
        assert!(!LedgerEvent::BalanceChanged { from: 1.0, to: 0.0 }.is_failure());
    }

    #[test]
    fn test_balance_transition() {
        let outcome = CommandOutcome {
            events: vec![
                LedgerEvent::HistoryAvailabilityChanged { has_entries: true },
                LedgerEvent::BalanceChanged { from: 10.0, to: 5.0 },
            ],
            ledger: LedgerView {
                balance: 5.0,
                display_balance: "5".to_string(),
                last_accrual_timestamp: 0,
                last_accrual_date: "1970/1/1".to_string(),
                history_len: 1,
                can_undo: true,
                can_record_payment: true,
                pending_days: 0,
                pending_interest: 0.0,
            },
        };
        assert_eq!(outcome.balance_transition(), Some((10.0, 5.0)));
    }
}
