//! # Ledger Repository
//!
//! Maps the ledger state onto three keys of the key-value store.
//!
//! | Key | Encoding |
//! |---|---|
//! | `debtAmount` | decimal string |
//! | `lastInterestDate` | integer string, epoch milliseconds |
//! | `debtHistory` | JSON array of `{"debt": number, "date": number}`, most recent first |
//!
//! Each field is loaded independently: a missing or corrupt value falls back
//! to its default without affecting the other two. A store that cannot be
//! read at all is an error, never a reason to start from defaults.

use anyhow::{Context, Result};
use shared::SnapshotRecord;
use std::sync::Arc;
use tracing::{debug, warn};

use super::traits::KeyValueStore;
use crate::domain::ledger_state::{History, LedgerState, Snapshot};

pub const BALANCE_KEY: &str = "debtAmount";
pub const LAST_ACCRUAL_KEY: &str = "lastInterestDate";
pub const HISTORY_KEY: &str = "debtHistory";

#[derive(Clone)]
pub struct LedgerRepository {
    store: Arc<dyn KeyValueStore>,
}

impl LedgerRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the ledger, using `initial_balance` and `now` for missing fields.
    pub async fn load(&self, initial_balance: f64, now: i64, max_history: usize) -> Result<LedgerState> {
        let balance = match self.read(BALANCE_KEY).await? {
            Some(raw) => decode_balance(&raw).unwrap_or_else(|| {
                warn!("Ignoring unparsable balance {:?}, using {}", raw, initial_balance);
                initial_balance
            }),
            None => initial_balance,
        };

        let last_accrual_timestamp = match self.read(LAST_ACCRUAL_KEY).await? {
            Some(raw) => decode_timestamp(&raw).unwrap_or_else(|| {
                warn!("Ignoring unparsable last accrual timestamp {:?}", raw);
                now
            }),
            None => now,
        };

        let history = match self.read(HISTORY_KEY).await? {
            Some(raw) => match decode_history(&raw) {
                Ok(records) => {
                    if records.len() > max_history {
                        warn!(
                            "Stored history has {} entries, keeping the newest {}",
                            records.len(),
                            max_history
                        );
                    }
                    History::from_entries(records.into_iter().map(Snapshot::from), max_history)
                }
                Err(e) => {
                    warn!("Ignoring unparsable history: {}", e);
                    History::new(max_history)
                }
            },
            None => History::new(max_history),
        };

        debug!(
            "Loaded ledger: balance={}, last_accrual={}, history_len={}",
            balance,
            last_accrual_timestamp,
            history.len()
        );
        Ok(LedgerState::new(balance, last_accrual_timestamp, history))
    }

    /// Save balance, timestamp and history in one write
    pub async fn save(&self, state: &LedgerState) -> Result<()> {
        let history_json = serde_json::to_string(&state.history.to_records())?;
        self.store
            .put_values(&[
                (BALANCE_KEY, encode_balance(state.balance)),
                (LAST_ACCRUAL_KEY, state.last_accrual_timestamp.to_string()),
                (HISTORY_KEY, history_json),
            ])
            .await?;
        debug!("Saved ledger: balance={}", state.balance);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<String>> {
        self.store
            .get_value(key)
            .await
            .with_context(|| format!("failed to read {} from the ledger store", key))
    }
}

/// Shortest decimal string that parses back to the same f64
fn encode_balance(balance: f64) -> String {
    balance.to_string()
}

fn decode_balance(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn decode_timestamp(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn decode_history(raw: &str) -> serde_json::Result<Vec<SnapshotRecord>> {
    serde_json::from_str(raw)
}
