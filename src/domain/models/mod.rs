//! Domain models for the Prism storage subsystem.

pub mod agent;
pub mod config;
pub mod handoff;
pub mod memory;
pub mod vector;

pub use agent::{AgentDefinition, HookEvent, HookSpec, ToolSpec};
pub use config::{
    BackendKind, Config, DatabaseConfig, DuplicatePolicy, FileConfig, HandoffConfig,
    LoggingConfig, MemoryConfig, RedisConfig, RetryConfig, VectorConfig, VectorProvider,
};
pub use handoff::{HandoffContext, HandoffState, Message, MessageRole};
pub use memory::MemoryEntry;
pub use vector::{rank_matches, NamespaceConfig, SimilarityMetric, VectorMatch, VectorRecord};
