//! Observability subsystem.
//!
//! Log lines only: startup, signal receipt, exit, and collaborator
//! bind/stop events, all emitted through `tracing`.

pub mod logging;

pub use logging::init_logging;
