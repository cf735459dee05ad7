//! # Domain Module
//!
//! Contains the business logic of the debt tracker: the ledger state, interest
//! accrual, the transaction and undo commands, and the presentation helpers
//! used by the CLI and REST layers.
//!
//! The domain never talks to a concrete database. It persists through the
//! [`LedgerRepository`](crate::storage::LedgerRepository), which sits on top
//! of any [`KeyValueStore`](crate::storage::KeyValueStore).
//!
//! ## Module Organization
//!
//! - **ledger_state**: balance, last accrual timestamp and the bounded undo history
//! - **accrual**: simple daily interest over whole elapsed days
//! - **ledger_service**: payment, borrow and undo commands; emits ledger events
//! - **amount**: validation and parsing of user-entered amounts
//! - **clock**: injectable time source
//! - **counter_animation**: cancellable animation of the displayed balance
//! - **display**: amount and date formatting, notification text
//! - **errors**: failures reported by ledger commands
//!
//! ## Business Rules
//!
//! - Interest is charged only when a transaction is recorded, never on read
//! - Any partial day counts as a whole day
//! - The balance never goes below zero; excess payment is discarded
//! - Undo restores the exact balance and timestamp captured before the last
//!   transaction and cannot itself be undone

pub mod accrual;
pub mod amount;
pub mod clock;
pub mod counter_animation;
pub mod display;
pub mod errors;
pub mod ledger_service;
pub mod ledger_state;

pub use accrual::{Accrual, AccrualEngine};
pub use amount::{parse_amount, validate_amount};
pub use clock::{Clock, ManualClock, SystemClock};
pub use counter_animation::CounterAnimator;
pub use errors::LedgerError;
pub use ledger_service::LedgerService;
pub use ledger_state::{History, LedgerState, Snapshot};
