use anyhow::Result;
use async_trait::async_trait;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info};

use super::traits::KeyValueStore;

/// DbConnection stores the ledger's key-value pairs in SQLite
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (and create if missing) the database at `url`
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating ledger database at {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ledger_values (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for DbConnection {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM ledger_values WHERE key = ?")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn put_values(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query("INSERT OR REPLACE INTO ledger_values (key, value) VALUES (?, ?)")
                .bind(*key)
                .bind(value.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        debug!("Stored {} values in one transaction", entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> DbConnection {
        DbConnection::init_test().await.expect("Failed to create test database")
    }

    #[tokio::test]
    async fn test_put_values_then_get() {
        let db = setup_test().await;

        db.put_values(&[
            ("debtAmount", "95082.5".to_string()),
            ("lastInterestDate", "1700000000000".to_string()),
            ("debtHistory", "[]".to_string()),
        ])
        .await
        .expect("Failed to put values");

        assert_eq!(db.get_value("debtAmount").await.unwrap().as_deref(), Some("95082.5"));
        assert_eq!(db.get_value("lastInterestDate").await.unwrap().as_deref(), Some("1700000000000"));
        assert_eq!(db.get_value("debtHistory").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_value() {
        let db = setup_test().await;

        let result = db.get_value("nonexistent_key").await.expect("Query failed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_values_replaces_existing() {
        let db = setup_test().await;

        db.put_values(&[("debtAmount", "1000".to_string()), ("lastInterestDate", "1".to_string())])
            .await
            .unwrap();
        db.put_values(&[("debtAmount", "2000".to_string())]).await.unwrap();

        assert_eq!(db.get_value("debtAmount").await.unwrap().as_deref(), Some("2000"));
        assert_eq!(db.get_value("lastInterestDate").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_put_values_is_all_or_nothing() {
        let db = setup_test().await;
        db.put_values(&[("debtAmount", "1000".to_string())]).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER reject_history BEFORE INSERT ON ledger_values \
             WHEN NEW.key = 'debtHistory' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(&*db.pool)
        .await
        .unwrap();

        let result = db
            .put_values(&[
                ("debtAmount", "2000".to_string()),
                ("debtHistory", "[]".to_string()),
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(db.get_value("debtAmount").await.unwrap().as_deref(), Some("1000"));
        assert!(db.get_value("debtHistory").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("sqlite:{}", dir.path().join("ledger.db").display());

        {
            let db = DbConnection::new(&url).await.unwrap();
            db.put_values(&[("debtAmount", "1234.5".to_string())]).await.unwrap();
            db.pool.close().await;
        }

        let reopened = DbConnection::new(&url).await.unwrap();
        assert_eq!(reopened.get_value("debtAmount").await.unwrap().as_deref(), Some("1234.5"));
    }
}
