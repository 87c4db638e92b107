//! Storage adapters.
//!
//! Each backend technology gets its own module implementing the domain
//! ports; [`build_backends`] is the composition root that turns a
//! [`Config`] into a wired set of trait objects. Nothing in here is a
//! global singleton, the caller owns the result.

pub mod file;
pub mod filter;
pub mod memory;
pub mod qdrant_http;
pub mod redis;
pub mod sqlite;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::domain::models::{BackendKind, Config, NamespaceConfig, VectorProvider};
use crate::domain::ports::{AgentRegistry, MemoryStore, VectorIndex};

use self::file::{FileRegistry, FileStore};
use self::memory::{InMemoryRegistry, InMemoryStore, InMemoryVectorIndex};
use self::qdrant_http::QdrantVectorIndex;
use self::redis::{RedisRegistry, RedisStore};
use self::sqlite::{all_embedded_migrations, create_pool, Migrator, PoolConfig, SqliteRegistry, SqliteStore, SqliteVectorIndex};

/// The wired storage backends for one process.
#[derive(Clone)]
pub struct Backends {
    pub registry: Arc<dyn AgentRegistry>,
    pub memory: Arc<dyn MemoryStore>,
    pub vector: Arc<dyn VectorIndex>,
}

/// Build the registry, memory store, and vector index selected by `config`.
pub async fn build_backends(config: &Config) -> anyhow::Result<Backends> {
    let namespace = NamespaceConfig {
        name: config.vector.namespace.clone(),
        dimension: config.vector.dimension,
        metric: config.vector.metric,
    };

    // One shared pool when anything runs on SQLite.
    let needs_sqlite = config.backend == BackendKind::Sqlite
        || config.vector.provider == VectorProvider::Sqlite;
    let pool = if needs_sqlite {
        let url = format!("sqlite:{}", config.database.path);
        let pool = create_pool(
            &url,
            Some(PoolConfig {
                max_connections: config.database.max_connections,
                ..PoolConfig::default()
            }),
        )
        .await
        .with_context(|| format!("opening database at {}", config.database.path))?;
        Migrator::new(pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .context("running database migrations")?;
        Some(pool)
    } else {
        None
    };

    let (registry, memory): (Arc<dyn AgentRegistry>, Arc<dyn MemoryStore>) = match config.backend {
        BackendKind::Memory => (
            Arc::new(InMemoryRegistry::new(config.duplicate_policy)),
            Arc::new(InMemoryStore::new()),
        ),
        BackendKind::File => {
            let registry_path = Path::new(&config.file.path).to_path_buf();
            let store_path = registry_path.with_file_name("memory.json");
            (
                Arc::new(FileRegistry::new(registry_path, config.duplicate_policy)),
                Arc::new(FileStore::new(store_path)),
            )
        }
        BackendKind::Redis => {
            let conn = self::redis::connect(&config.redis.url)
                .await
                .with_context(|| format!("connecting to redis at {}", config.redis.url))?;
            (
                Arc::new(RedisRegistry::new(
                    conn.clone(),
                    config.redis.prefix.clone(),
                    config.duplicate_policy,
                )),
                Arc::new(RedisStore::new(conn, config.redis.prefix.clone())),
            )
        }
        BackendKind::Sqlite => {
            let pool = pool
                .clone()
                .context("sqlite pool missing for sqlite backend")?;
            (
                Arc::new(SqliteRegistry::new(pool.clone(), config.duplicate_policy)),
                Arc::new(SqliteStore::new(pool)),
            )
        }
    };

    let vector: Arc<dyn VectorIndex> = match config.vector.provider {
        VectorProvider::Memory => Arc::new(InMemoryVectorIndex::new(namespace)),
        VectorProvider::Sqlite => {
            let pool = pool.context("sqlite pool missing for sqlite vector provider")?;
            Arc::new(SqliteVectorIndex::new(pool, namespace))
        }
        VectorProvider::Qdrant => {
            Arc::new(QdrantVectorIndex::new(config.vector.endpoint.clone(), namespace))
        }
    };

    tracing::info!(
        backend = ?config.backend,
        vector = ?config.vector.provider,
        "storage backends ready"
    );

    Ok(Backends { registry, memory, vector })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::AgentDefinition;

    #[tokio::test]
    async fn test_build_memory_backends() {
        let config = Config::default();
        let backends = build_backends(&config).await.unwrap();

        let agent = AgentDefinition::new("wired", "You are wired.", "gpt-4o");
        backends.registry.register(&agent).await.unwrap();
        assert!(backends.registry.exists("wired").await.unwrap());
    }

    #[tokio::test]
    async fn test_build_sqlite_backends_in_tempdir() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config {
            backend: BackendKind::Sqlite,
            ..Config::default()
        };
        config.vector.provider = VectorProvider::Sqlite;
        config.vector.dimension = 3;
        config.database.path = dir.path().join("prism.db").display().to_string();

        let backends = build_backends(&config).await.unwrap();
        backends
            .memory
            .set("k", serde_json::json!(1), None)
            .await
            .unwrap();
        assert_eq!(
            backends.memory.get("k").await.unwrap(),
            Some(serde_json::json!(1))
        );
    }
}
