//! Domain layer for the Prism storage subsystem.
//!
//! Core models, the error taxonomy, and the port contracts that every
//! backend adapter implements.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{StorageError, StorageResult};
