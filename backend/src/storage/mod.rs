//! # Storage Module
//!
//! Persistence for the ledger. Everything is stored as strings under a handful
//! of keys, so any key-value backend works.
//!
//! ## Current Implementation
//!
//! - **DbConnection**: SQLite through SQLx, one `ledger_values` table
//! - **MemoryStore**: process-local map for tests and `--ephemeral` runs
//! - **LedgerRepository**: encodes the ledger state onto the store keys
//!
//! Multi-key writes go through [`KeyValueStore::put_values`], which is atomic,
//! so a crash never leaves a new balance next to an old history.

pub mod db;
pub mod ledger_repository;
pub mod memory;
pub mod traits;

pub use db::DbConnection;
pub use ledger_repository::LedgerRepository;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;
