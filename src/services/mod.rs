//! Application services layered over the domain ports.
//!
//! Everything here works against trait objects, so any backend selected by
//! `adapters::build_backends` can sit underneath.

pub mod agent_factory;
pub mod chat;
pub mod handoff;
pub mod retry;

pub use agent_factory::{AgentFactory, AgentSpec, Complexity};
pub use chat::ChatStore;
pub use handoff::{HandoffOutcome, HandoffRouter};
pub use retry::{with_backoff, with_deadline};
