use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::traits::KeyValueStore;

/// Volatile key-value store for tests and `--ephemeral` sessions
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    values: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`
    pub fn with_values<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn put_values(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut values = self.values.write().map_err(|_| anyhow!("memory store lock poisoned"))?;
        for (key, value) in entries {
            values.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_contents() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.put_values(&[("debtAmount", "10".to_string())]).await.unwrap();
        assert_eq!(other.get_value("debtAmount").await.unwrap().as_deref(), Some("10"));
    }

    #[tokio::test]
    async fn test_with_values_then_overwrite() {
        let store = MemoryStore::with_values([("debtAmount", "2"), ("lastInterestDate", "1")]);

        store.put_values(&[("debtAmount", "3".to_string())]).await.unwrap();

        assert_eq!(store.get_value("debtAmount").await.unwrap().as_deref(), Some("3"));
        assert_eq!(store.get_value("lastInterestDate").await.unwrap().as_deref(), Some("1"));
        assert!(store.get_value("debtHistory").await.unwrap().is_none());
    }
}
