//! Presentation helpers: rounded amounts with thousands separators, accrual
//! dates, and the user-facing text for each ledger notification.

use chrono::{Local, TimeZone};
use shared::LedgerEvent;
use std::fmt::Display;

/// Round to whole units and group digits in threes, e.g. `95082.19` -> `95,082`
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Render an epoch-millisecond instant as a local `YYYY/M/D` date
pub fn format_date(timestamp_ms: i64) -> String {
    format_date_in(timestamp_ms, &Local)
}

pub fn format_date_in<Tz>(timestamp_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_millis_opt(timestamp_ms).single() {
        Some(date_time) => date_time.format("%Y/%-m/%-d").to_string(),
        None => timestamp_ms.to_string(),
    }
}

/// Text shown to the user for an event, or `None` for events that only
/// drive rendering (balance animation, undo enablement).
pub fn notification_message(event: &LedgerEvent) -> Option<String> {
    match event {
        LedgerEvent::InterestAccrued { days, amount } => Some(format!(
            "{} day{} passed, so {} in interest was added.",
            days,
            if *days == 1 { "" } else { "s" },
            format_amount(*amount)
        )),
        LedgerEvent::BorrowRecorded { amount } => {
            Some(format!("{} was added to the debt.", format_amount(*amount as f64)))
        }
        LedgerEvent::UndoApplied { .. } => Some("Reverted the last operation.".to_string()),
        LedgerEvent::PaymentIgnored => {
            Some("Nothing is owed, so the payment was not recorded.".to_string())
        }
        LedgerEvent::InvalidInput => Some("Please enter a valid amount.".to_string()),
        LedgerEvent::NoHistory => Some("There is nothing to undo.".to_string()),
        LedgerEvent::PersistenceFailed { reason } => Some(format!(
            "The ledger could not be saved ({}). This session's changes will be lost on restart.",
            reason
        )),
        LedgerEvent::BalanceChanged { .. } | LedgerEvent::HistoryAvailabilityChanged { .. } => None,
    }
}
