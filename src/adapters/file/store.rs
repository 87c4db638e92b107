//! File-backed memory store.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::errors::StorageResult;
use crate::domain::models::MemoryEntry;
use crate::domain::ports::{MemoryStore, TtlSupport};

use super::{read_document, write_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    entries: HashMap<String, MemoryEntry>,
}

/// Keyed blob store persisted as a JSON file.
///
/// TTL is emulated: expired entries are invisible on read and purged on
/// the next write.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    async fn persist(&self, doc: &StoreDocument) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        write_atomic(&self.path, &bytes).await
    }
}

#[async_trait]
impl MemoryStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<serde_json::Value>> {
        let doc: StoreDocument = read_document(&self.path).await?;
        Ok(doc
            .entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl_secs: Option<u64>) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc: StoreDocument = read_document(&self.path).await?;
        doc.entries.retain(|_, e| !e.is_expired());
        doc.entries.insert(key.to_string(), MemoryEntry::new(key, value, ttl_secs));
        self.persist(&doc).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc: StoreDocument = read_document(&self.path).await?;
        doc.entries.remove(key);
        doc.entries.retain(|_, e| !e.is_expired());
        self.persist(&doc).await
    }

    fn ttl_support(&self) -> TtlSupport {
        TtlSupport::LazyExpiry
    }
}
