//! In-process agent registry.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{AgentDefinition, DuplicatePolicy};
use crate::domain::ports::AgentRegistry;

struct Inner {
    agents: HashMap<String, AgentDefinition>,
    /// Registration order, for deterministic `list()`.
    order: Vec<String>,
}

/// Embedded registry backed by a lock-guarded map.
///
/// Check-then-insert happens inside one write-lock critical section, so a
/// register race has exactly one winner.
pub struct InMemoryRegistry {
    inner: RwLock<Inner>,
    policy: DuplicatePolicy,
}

impl InMemoryRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            inner: RwLock::new(Inner { agents: HashMap::new(), order: Vec::new() }),
            policy,
        }
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new(DuplicatePolicy::Reject)
    }
}

#[async_trait]
impl AgentRegistry for InMemoryRegistry {
    async fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.inner.read().await.agents.contains_key(name))
    }

    async fn register(&self, agent: &AgentDefinition) -> StorageResult<()> {
        agent.validate().map_err(StorageError::Validation)?;

        let mut inner = self.inner.write().await;
        if inner.agents.contains_key(&agent.name) {
            if self.policy == DuplicatePolicy::Reject {
                return Err(StorageError::AgentExists(agent.name.clone()));
            }
            // Replace keeps the original insertion position
            inner.agents.insert(agent.name.clone(), agent.clone());
        } else {
            inner.order.push(agent.name.clone());
            inner.agents.insert(agent.name.clone(), agent.clone());
        }
        tracing::debug!(agent = %agent.name, "registered agent");
        Ok(())
    }

    async fn get(&self, name: &str) -> StorageResult<AgentDefinition> {
        self.inner
            .read()
            .await
            .agents
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::AgentNotFound(name.to_string()))
    }

    async fn get_optional(&self, name: &str) -> StorageResult<Option<AgentDefinition>> {
        Ok(self.inner.read().await.agents.get(name).cloned())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        Ok(self.inner.read().await.order.clone())
    }
}
