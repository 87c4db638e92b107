//! File-backed agent registry.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{AgentDefinition, DuplicatePolicy};
use crate::domain::ports::AgentRegistry;

use super::{read_document, write_atomic};

/// On-disk registry document. A `Vec` keeps registration order.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryDocument {
    agents: Vec<AgentDefinition>,
}

impl RegistryDocument {
    fn find(&self, name: &str) -> Option<&AgentDefinition> {
        self.agents.iter().find(|a| a.name == name)
    }
}

/// Registry persisted as a JSON file.
///
/// The write mutex makes check-then-append a single atomic step; the
/// rename-based persist means readers only ever see a complete document.
pub struct FileRegistry {
    path: PathBuf,
    policy: DuplicatePolicy,
    write_lock: Mutex<()>,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>, policy: DuplicatePolicy) -> Self {
        Self { path: path.into(), policy, write_lock: Mutex::new(()) }
    }
}

#[async_trait]
impl AgentRegistry for FileRegistry {
    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let doc: RegistryDocument = read_document(&self.path).await?;
        Ok(doc.find(name).is_some())
    }

    async fn register(&self, agent: &AgentDefinition) -> StorageResult<()> {
        agent.validate().map_err(StorageError::Validation)?;

        let _guard = self.write_lock.lock().await;
        let mut doc: RegistryDocument = read_document(&self.path).await?;

        if let Some(pos) = doc.agents.iter().position(|a| a.name == agent.name) {
            if self.policy == DuplicatePolicy::Reject {
                return Err(StorageError::AgentExists(agent.name.clone()));
            }
            doc.agents[pos] = agent.clone();
        } else {
            doc.agents.push(agent.clone());
        }

        let bytes = serde_json::to_vec_pretty(&doc)?;
        write_atomic(&self.path, &bytes).await?;
        tracing::debug!(agent = %agent.name, path = %self.path.display(), "registered agent");
        Ok(())
    }

    async fn get(&self, name: &str) -> StorageResult<AgentDefinition> {
        let doc: RegistryDocument = read_document(&self.path).await?;
        doc.find(name)
            .cloned()
            .ok_or_else(|| StorageError::AgentNotFound(name.to_string()))
    }

    async fn get_optional(&self, name: &str) -> StorageResult<Option<AgentDefinition>> {
        let doc: RegistryDocument = read_document(&self.path).await?;
        Ok(doc.find(name).cloned())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let doc: RegistryDocument = read_document(&self.path).await?;
        Ok(doc.agents.into_iter().map(|a| a.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn agent(name: &str) -> AgentDefinition {
        AgentDefinition::new(name, "You are a test agent.", "gpt-4o")
    }

    fn registry(dir: &TempDir) -> FileRegistry {
        FileRegistry::new(dir.path().join("registry.json"), DuplicatePolicy::Reject)
    }

    #[tokio::test]
    async fn test_register_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");

        let first = FileRegistry::new(&path, DuplicatePolicy::Reject);
        first.register(&agent("alpha")).await.unwrap();

        // A fresh instance over the same file sees the agent
        let second = FileRegistry::new(&path, DuplicatePolicy::Reject);
        assert!(second.exists("alpha").await.unwrap());
        assert_eq!(second.get("alpha").await.unwrap().name, "alpha");
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let dir = TempDir::new().unwrap();
        let reg = registry(&dir);
        reg.register(&agent("alpha")).await.unwrap();

        let err = reg.register(&agent("alpha")).await.unwrap_err();
        assert!(matches!(err, StorageError::AgentExists(_)));
    }

    #[tokio::test]
    async fn test_replace_policy() {
        let dir = TempDir::new().unwrap();
        let reg = FileRegistry::new(dir.path().join("r.json"), DuplicatePolicy::Replace);
        reg.register(&agent("alpha")).await.unwrap();

        let mut updated = agent("alpha");
        updated.model = "claude-sonnet".to_string();
        reg.register(&updated).await.unwrap();

        assert_eq!(reg.get("alpha").await.unwrap().model, "claude-sonnet");
        assert_eq!(reg.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_registry() {
        let dir = TempDir::new().unwrap();
        let reg = registry(&dir);
        assert!(!reg.exists("anyone").await.unwrap());
        assert!(reg.list().await.unwrap().is_empty());
        assert!(reg.get_optional("anyone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let dir = TempDir::new().unwrap();
        let reg = registry(&dir);
        for name in ["c", "a", "b"] {
            reg.register(&agent(name)).await.unwrap();
        }
        assert_eq!(reg.list().await.unwrap(), vec!["c", "a", "b"]);
    }
}
