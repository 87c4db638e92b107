//! Memory store port.

use async_trait::async_trait;

use crate::domain::errors::StorageResult;

/// How a backend honors TTLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlSupport {
    /// The backing service expires keys itself (e.g. Redis `SET EX`).
    Native,
    /// Best-effort expiry enforced on read.
    LazyExpiry,
}

/// Generic keyed blob store for chat history and arbitrary JSON state.
///
/// All operations are idempotent: deleting an absent key succeeds and
/// setting the same key twice overwrites.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Fetch a value by key, `None` on a miss or after TTL expiry.
    async fn get(&self, key: &str) -> StorageResult<Option<serde_json::Value>>;

    /// Store a value, optionally expiring after `ttl_secs` seconds.
    async fn set(&self, key: &str, value: serde_json::Value, ttl_secs: Option<u64>) -> StorageResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// How this backend enforces TTLs. Backends never silently ignore one.
    fn ttl_support(&self) -> TtlSupport;
}
