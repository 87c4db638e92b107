//! Redis adapters: shared registry and memory store for multi-process
//! deployments. Connections go through a [`redis::aio::ConnectionManager`],
//! which reconnects transparently after network failures.

pub mod registry;
pub mod store;

pub use registry::RedisRegistry;
pub use store::RedisStore;

use redis::aio::ConnectionManager;

use crate::domain::errors::StorageResult;

/// Open a managed connection to the Redis instance at `url`.
pub async fn connect(url: &str) -> StorageResult<ConnectionManager> {
    let client = redis::Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;
    Ok(manager)
}
