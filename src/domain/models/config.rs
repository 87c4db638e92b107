//! Configuration model for the storage subsystem.
//!
//! Owned by the process composition root; loaded by
//! `infrastructure::config::ConfigLoader` and passed explicitly to
//! `adapters::build_backends`. No ambient global state.

use serde::{Deserialize, Serialize};

use super::vector::SimilarityMetric;

/// Storage backend selection for the registry and memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Embedded in-process store, lost on restart.
    Memory,
    /// JSON file on local disk.
    File,
    /// Remote Redis key-value store.
    Redis,
    /// Relational SQLite database.
    Sqlite,
}

/// Vector index provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorProvider {
    Memory,
    Sqlite,
    Qdrant,
}

/// Duplicate-registration policy for the agent registry.
///
/// Reject is the default; idempotent get-or-create lives one layer up in
/// `services::AgentFactory`, not in the registry itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: ".prism/prism.db".to_string(), max_connections: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    /// Key prefix isolating this deployment's keys.
    pub prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self { url: "redis://localhost:6379/0".to_string(), prefix: "prism:".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub path: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self { path: ".prism/registry.json".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorConfig {
    pub provider: VectorProvider,
    /// Endpoint for remote vector services, ignored by local providers.
    pub endpoint: String,
    pub namespace: String,
    pub dimension: usize,
    pub metric: SimilarityMetric,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            provider: VectorProvider::Memory,
            endpoint: "http://localhost:6333".to_string(),
            namespace: "default".to_string(),
            dimension: 512,
            metric: SimilarityMetric::Cosine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Default TTL in seconds applied when a `set` passes no TTL, 0 = none.
    pub default_ttl_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { default_ttl_secs: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffConfig {
    /// Maximum completed handoffs per conversation before forced termination.
    pub max_handoffs: u32,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self { max_handoffs: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, initial_backoff_ms: 250, max_backoff_ms: 10_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Directory for rolling log files, `None` for stdout only.
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string(), log_dir: None }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub duplicate_policy: DuplicatePolicy,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub file: FileConfig,
    pub vector: VectorConfig,
    pub memory: MemoryConfig,
    pub handoff: HandoffConfig,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
    /// Per-operation deadline in milliseconds for backend calls.
    pub operation_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            duplicate_policy: DuplicatePolicy::Reject,
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            file: FileConfig::default(),
            vector: VectorConfig::default(),
            memory: MemoryConfig::default(),
            handoff: HandoffConfig::default(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
            operation_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.vector.dimension, 512);
        assert_eq!(config.vector.metric, SimilarityMetric::Cosine);
        assert_eq!(config.handoff.max_handoffs, 10);
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
backend: sqlite
database:
  path: /custom/prism.db
  max_connections: 8
vector:
  provider: qdrant
  endpoint: http://qdrant.internal:6333
  namespace: memories
  dimension: 1536
  metric: euclidean
handoff:
  max_handoffs: 4
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.database.path, "/custom/prism.db");
        assert_eq!(config.vector.provider, VectorProvider::Qdrant);
        assert_eq!(config.vector.dimension, 1536);
        assert_eq!(config.vector.metric, SimilarityMetric::Euclidean);
        assert_eq!(config.handoff.max_handoffs, 4);
        // Untouched sections keep defaults
        assert_eq!(config.redis.prefix, "prism:");
    }
}
