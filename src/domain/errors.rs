//! Domain errors for the Prism storage subsystem.

use thiserror::Error;

/// Errors surfaced by the registry, memory, and vector contracts.
///
/// Validation errors (`DimensionMismatch`, `Validation`) indicate caller
/// misuse and are never retried. `BackendUnavailable` is the only class
/// eligible for automatic retry with bounded backoff.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Agent already registered: {0}")]
    AgentExists(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Filter not supported by the {backend} backend: {detail}")]
    FilterUnsupported { backend: &'static str, detail: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Handoff loop exceeded: {limit} handoffs already taken")]
    HandoffLoopExceeded { limit: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Whether the error is transient and safe to retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::BackendUnavailable(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::BackendUnavailable(err.to_string())
    }
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        StorageError::BackendUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::BackendUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
