//! Agent registry port.

use async_trait::async_trait;

use crate::domain::errors::StorageResult;
use crate::domain::models::AgentDefinition;

/// Identity-authoritative store mapping agent name to definition.
///
/// Implemented identically across every backend. Registration is atomic
/// with respect to concurrent `register` calls for the same name: at most
/// one writer's definition survives a race and no reader ever observes a
/// partially written definition. Implementations use a single conditional
/// primitive (lock-guarded insert, server-side script, unique constraint),
/// never a separate exists-then-register sequence.
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    /// Check whether an agent with the given name is registered.
    ///
    /// A lookup miss returns `Ok(false)`; a backend that cannot answer
    /// returns `Err(BackendUnavailable)` so callers can distinguish
    /// "not found" from "could not determine".
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Register an agent under its name.
    ///
    /// With the Reject policy (default) a duplicate name fails with
    /// `AgentExists` and leaves the stored definition unchanged; with
    /// Replace the definition is overwritten atomically.
    async fn register(&self, agent: &AgentDefinition) -> StorageResult<()>;

    /// Get an agent by name, failing with `AgentNotFound` if absent.
    async fn get(&self, name: &str) -> StorageResult<AgentDefinition>;

    /// Get an agent by name, `None` on a miss.
    async fn get_optional(&self, name: &str) -> StorageResult<Option<AgentDefinition>>;

    /// List registered agent names.
    ///
    /// Embedded and file backends preserve insertion order; remote
    /// backends make no ordering guarantee.
    async fn list(&self) -> StorageResult<Vec<String>>;
}
