//! Prism - Agent Registry & Pluggable Memory Subsystem
//!
//! Prism is the storage core of a multi-agent runtime: an authoritative
//! agent registry, a keyed memory store, and a k-nearest-neighbor vector
//! index, each implemented uniformly over pluggable backends (embedded
//! memory, local file, Redis, SQLite, and a remote vector service).
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, storage ports, and the error taxonomy
//! - **Adapter Layer** (`adapters`): One module per backend technology plus
//!   the `build_backends` composition root
//! - **Service Layer** (`services`): Agent factory, handoff router, chat
//!   history, retry/deadline policy
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//!
//! # Example
//!
//! ```ignore
//! use prism::adapters::build_backends;
//! use prism::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let backends = build_backends(&config).await?;
//!     let names = backends.registry.list().await?;
//!     println!("{names:?}");
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{build_backends, Backends};
pub use domain::errors::{StorageError, StorageResult};
pub use domain::models::{
    AgentDefinition, BackendKind, Config, DuplicatePolicy, HandoffContext, HandoffState,
    HookEvent, HookSpec, MemoryEntry, Message, MessageRole, NamespaceConfig, SimilarityMetric,
    ToolSpec, VectorMatch, VectorProvider, VectorRecord,
};
pub use domain::ports::{AgentRegistry, MemoryStore, TtlSupport, VectorIndex};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::Logger;
pub use services::{AgentFactory, AgentSpec, ChatStore, HandoffOutcome, HandoffRouter};
