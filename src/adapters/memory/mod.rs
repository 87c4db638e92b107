//! Embedded in-process backend.
//!
//! Development/testing backend; all data is lost when the process exits.
//! The interior maps are the one mutable shared structure in the subsystem
//! that needs explicit mutual exclusion. Locks are only held across
//! synchronous map operations, never across an await point.

mod registry;
mod store;
mod vector;

pub use registry::InMemoryRegistry;
pub use store::InMemoryStore;
pub use vector::InMemoryVectorIndex;
