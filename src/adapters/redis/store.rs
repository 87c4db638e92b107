//! Redis implementation of the memory store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::ports::{MemoryStore, TtlSupport};

/// Keyed store over Redis strings. TTLs map straight onto `SET EX`, so
/// expiry is handled by the server rather than on read.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    fn entry_key(&self, key: &str) -> String {
        format!("{}mem:{}", self.prefix, key)
    }
}

#[async_trait]
impl MemoryStore for RedisStore {
    async fn get(&self, key: &str) -> StorageResult<Option<serde_json::Value>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.entry_key(key)).await?;
        raw.map(|json| serde_json::from_str(&json).map_err(StorageError::from))
            .transpose()
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl_secs: Option<u64>) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        let entry_key = self.entry_key(key);

        // EX 0 is rejected by the server; a zero TTL means "already expired".
        if ttl_secs == Some(0) {
            let _: () = conn.del(&entry_key).await?;
            return Ok(());
        }

        let payload = serde_json::to_string(&value)?;
        match ttl_secs {
            Some(secs) => {
                let _: () = conn.set_ex(&entry_key, payload, secs).await?;
            }
            None => {
                let _: () = conn.set(&entry_key, payload).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.entry_key(key)).await?;
        Ok(())
    }

    fn ttl_support(&self) -> TtlSupport {
        TtlSupport::Native
    }
}
