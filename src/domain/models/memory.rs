//! Memory entry model for the keyed blob store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single keyed entry in a memory store.
///
/// Created on `set`, overwritten by a later `set` with the same key,
/// removed on `delete` or TTL expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub key: String,
    pub value: serde_json::Value,
    /// Absolute expiry instant, `None` for no expiry.
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(key: impl Into<String>, value: serde_json::Value, ttl_secs: Option<u64>) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            value,
            expires_at: ttl_secs.map(|s| now + Duration::seconds(s as i64)),
            created_at: now,
        }
    }

    /// Whether the entry has passed its expiry instant.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|t| t <= Utc::now())
    }
}
