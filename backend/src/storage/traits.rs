//! # Storage Traits
//!
//! The persistence adapter seen by the domain layer: a string key-value store
//! that survives process restarts. Implementations can be swapped (SQLite,
//! in-memory) without touching the ledger logic.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Store several values at once, overwriting existing values.
    ///
    /// Either every entry is written or none is.
    async fn put_values(&self, entries: &[(&str, String)]) -> Result<()>;
}
