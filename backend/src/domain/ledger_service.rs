//! Ledger service: the single owner of the ledger state.
//!
//! Every mutating command follows the same sequence: validate, capture a
//! snapshot for undo, charge interest up to now, apply the change, persist,
//! and return the events the presentation layer renders. A failed save never
//! rolls back the in-memory state; it is reported as a `PersistenceFailed`
//! event instead.

use shared::{CommandOutcome, LedgerEvent, LedgerView, SnapshotRecord};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::accrual::AccrualEngine;
use super::amount::validate_amount;
use super::clock::Clock;
use super::display::{format_amount, format_date};
use super::errors::LedgerError;
use super::ledger_state::LedgerState;
use crate::config::LedgerConfig;
use crate::storage::LedgerRepository;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TransactionKind {
    Payment,
    Borrow,
}

pub struct LedgerService {
    repository: LedgerRepository,
    engine: AccrualEngine,
    clock: Arc<dyn Clock>,
    state: LedgerState,
}

impl LedgerService {
    /// Load the persisted ledger, falling back to defaults field by field.
    ///
    /// Fails when the store cannot be read, so a ledger that was not loaded
    /// is never saved over the persisted one.
    pub async fn load(
        repository: LedgerRepository,
        config: &LedgerConfig,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let now = clock.now_millis();
        let state = repository
            .load(config.initial_balance, now, config.max_history)
            .await?;
        info!(
            "Ledger loaded: balance={:.2}, last_accrual={}, {} undo step(s) available",
            state.balance,
            state.last_accrual_timestamp,
            state.history.len()
        );

        Ok(Self {
            repository,
            engine: AccrualEngine::new(config.annual_rate),
            clock,
            state,
        })
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Undo stack, most recent first
    pub fn history(&self) -> Vec<SnapshotRecord> {
        self.state.history.to_records()
    }

    /// Current read model, including the interest a transaction recorded now
    /// would charge
    pub fn view(&self) -> LedgerView {
        let pending = self.engine.accrue(
            self.state.balance,
            self.state.last_accrual_timestamp,
            self.clock.now_millis(),
        );

        LedgerView {
            balance: self.state.balance,
            display_balance: format_amount(self.state.balance),
            last_accrual_timestamp: self.state.last_accrual_timestamp,
            last_accrual_date: format_date(self.state.last_accrual_timestamp),
            history_len: self.state.history.len(),
            can_undo: !self.state.history.is_empty(),
            can_record_payment: self.state.balance > 0.0,
            pending_days: pending.elapsed_days,
            pending_interest: pending.interest_applied,
        }
    }

    /// Record a payment. Interest is charged first, then the payment is
    /// subtracted; the balance never goes below zero and any excess is lost.
    pub async fn record_payment(&mut self, amount: f64) -> Result<CommandOutcome, LedgerError> {
        info!("Recording payment of {}", amount);
        let amount = validate_amount(amount).map_err(|e| {
            warn!("Rejected payment: {}", e);
            e
        })?;

        if self.state.balance <= 0.0 {
            info!("Ignoring payment of {}: nothing is owed", amount);
            return Ok(self.outcome(vec![LedgerEvent::PaymentIgnored]));
        }

        Ok(self.apply_transaction(TransactionKind::Payment, amount).await)
    }

    /// Record a borrow. Interest is charged first, then the amount is added.
    pub async fn record_borrow(&mut self, amount: f64) -> Result<CommandOutcome, LedgerError> {
        info!("Recording borrow of {}", amount);
        let amount = validate_amount(amount).map_err(|e| {
            warn!("Rejected borrow: {}", e);
            e
        })?;

        Ok(self.apply_transaction(TransactionKind::Borrow, amount).await)
    }

    /// Restore the state captured before the most recent transaction.
    ///
    /// Undo itself is not recorded, so it cannot be undone.
    pub async fn undo(&mut self) -> Result<CommandOutcome, LedgerError> {
        let snapshot = match self.state.history.pop() {
            Some(snapshot) => snapshot,
            None => {
                info!("Undo requested with empty history");
                return Err(LedgerError::NoHistory);
            }
        };

        let balance_before = self.state.balance;
        self.state.restore(snapshot);
        info!(
            "Undo restored balance {:.2} -> {:.2} (timestamp {})",
            balance_before,
            snapshot.balance(),
            snapshot.timestamp()
        );

        let mut events = vec![
            LedgerEvent::HistoryAvailabilityChanged {
                has_entries: !self.state.history.is_empty(),
            },
            LedgerEvent::UndoApplied {
                restored_timestamp: snapshot.timestamp(),
            },
            LedgerEvent::BalanceChanged {
                from: balance_before,
                to: snapshot.balance(),
            },
        ];
        self.persist(&mut events).await;

        Ok(self.outcome(events))
    }

    /// Write the current state to the store
    pub async fn save(&self) -> Result<(), LedgerError> {
        self.repository
            .save(&self.state)
            .await
            .map_err(|e| LedgerError::PersistenceUnavailable(e.to_string()))
    }

    async fn apply_transaction(&mut self, kind: TransactionKind, amount: u64) -> CommandOutcome {
        let now = self.clock.now_millis();
        let mut events = Vec::new();

        if let Some(evicted) = self.state.history.push(self.state.snapshot()) {
            debug!(
                "History full, dropped oldest snapshot (balance={:.2}, timestamp={})",
                evicted.balance(),
                evicted.timestamp()
            );
        }
        events.push(LedgerEvent::HistoryAvailabilityChanged { has_entries: true });

        let accrual = self
            .engine
            .accrue(self.state.balance, self.state.last_accrual_timestamp, now);
        if accrual.is_charged() {
            info!(
                "Charged {:.2} interest for {} day(s)",
                accrual.interest_applied, accrual.elapsed_days
            );
            events.push(LedgerEvent::InterestAccrued {
                days: accrual.elapsed_days,
                amount: accrual.interest_applied,
            });
        }

        let start_balance = accrual.new_balance;
        let end_balance = match kind {
            TransactionKind::Payment => (start_balance - amount as f64).max(0.0),
            TransactionKind::Borrow => start_balance + amount as f64,
        };
        self.state.balance = end_balance;
        self.state.last_accrual_timestamp = now;

        if kind == TransactionKind::Borrow {
            events.push(LedgerEvent::BorrowRecorded { amount });
        }
        events.push(LedgerEvent::BalanceChanged {
            from: start_balance,
            to: end_balance,
        });
        info!(
            "{:?} of {} applied: balance {:.2} -> {:.2}",
            kind, amount, start_balance, end_balance
        );

        self.persist(&mut events).await;
        self.outcome(events)
    }

    async fn persist(&self, events: &mut Vec<LedgerEvent>) {
        if let Err(e) = self.save().await {
            error!("Ledger changed in memory but was not saved: {}", e);
            events.push(e.to_event());
        }
    }

    fn outcome(&self, events: Vec<LedgerEvent>) -> CommandOutcome {
        CommandOutcome {
            events,
            ledger: self.view(),
        }
    }
}
