//! Port trait definitions (Hexagonal Architecture).
//!
//! Async trait interfaces the backend adapters implement:
//! - `AgentRegistry`: durable agent identity
//! - `MemoryStore`: keyed JSON blob storage with TTL
//! - `VectorIndex`: k-NN similarity search
//!
//! These contracts keep the domain independent of any storage technology.

pub mod agent_registry;
pub mod memory_store;
pub mod vector_index;

pub use agent_registry::AgentRegistry;
pub use memory_store::{MemoryStore, TtlSupport};
pub use vector_index::VectorIndex;
