//! In-process memory store with lazy TTL expiry.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::StorageResult;
use crate::domain::models::MemoryEntry;
use crate::domain::ports::{MemoryStore, TtlSupport};

/// Embedded keyed blob store. Expired entries are dropped on read.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<serde_json::Value>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        // Expired: upgrade to a write lock and evict
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(MemoryEntry::is_expired) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl_secs: Option<u64>) -> StorageResult<()> {
        let entry = MemoryEntry::new(key, value, ttl_secs);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn ttl_support(&self) -> TtlSupport {
        TtlSupport::LazyExpiry
    }
}
