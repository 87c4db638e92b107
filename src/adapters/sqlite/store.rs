//! SQLite implementation of the memory store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::StorageResult;
use crate::domain::models::MemoryEntry;
use crate::domain::ports::{MemoryStore, TtlSupport};

/// Keyed blob store over the `memory_entries` table.
///
/// TTL is enforced lazily: reads filter on `expires_at` and evict stale
/// rows opportunistically.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Remove every expired row. Also called by reads on a stale hit.
    pub async fn purge_expired(&self) -> StorageResult<u64> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query("DELETE FROM memory_entries WHERE expires_at IS NOT NULL AND expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MemoryStore for SqliteStore {
    async fn get(&self, key: &str) -> StorageResult<Option<serde_json::Value>> {
        let now = Utc::now().to_rfc3339();
        let row: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT value, expires_at FROM memory_entries WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Ok(None),
            Some((_, Some(expires_at))) if expires_at <= now => {
                self.purge_expired().await?;
                Ok(None)
            }
            Some((value, _)) => Ok(Some(serde_json::from_str(&value)?)),
        }
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl_secs: Option<u64>) -> StorageResult<()> {
        let entry = MemoryEntry::new(key, value, ttl_secs);
        let value_json = serde_json::to_string(&entry.value)?;

        sqlx::query(
            r#"INSERT INTO memory_entries (key, value, expires_at, created_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   expires_at = excluded.expires_at,
                   created_at = excluded.created_at"#,
        )
        .bind(key)
        .bind(&value_json)
        .bind(entry.expires_at.map(|t| t.to_rfc3339()))
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM memory_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn ttl_support(&self) -> TtlSupport {
        TtlSupport::LazyExpiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use serde_json::json;

    async fn setup() -> SqliteStore {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let store = setup().await;
        store.set("chat:1", json!(["hello"]), None).await.unwrap();
        assert_eq!(store.get("chat:1").await.unwrap(), Some(json!(["hello"])));

        store.set("chat:1", json!(["hello", "again"]), None).await.unwrap();
        assert_eq!(
            store.get("chat:1").await.unwrap(),
            Some(json!(["hello", "again"]))
        );
    }

    #[tokio::test]
    async fn test_missing_key() {
        let store = setup().await;
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_idempotent() {
        let store = setup().await;
        store.set("k", json!(1), None).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_gone_and_purged() {
        let store = setup().await;
        store.set("gone", json!("x"), Some(0)).await.unwrap();
        assert_eq!(store.get("gone").await.unwrap(), None);

        // Row was evicted, not just hidden
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memory_entries WHERE key = 'gone'")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_future_ttl_still_readable() {
        let store = setup().await;
        store.set("kept", json!("v"), Some(3600)).await.unwrap();
        assert_eq!(store.get("kept").await.unwrap(), Some(json!("v")));
        assert_eq!(store.ttl_support(), TtlSupport::LazyExpiry);
    }
}
