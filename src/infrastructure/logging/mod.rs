//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout formatting
//! - Optional daily-rolling file output

pub mod logger;

pub use logger::Logger;
