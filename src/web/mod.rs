//! Web UI subsystem.
//!
//! # Data Flow
//! ```text
//! Browser / curl
//!     → server.rs (Axum router, trace layer)
//!     → handlers.rs (read the display channel registry)
//! ```

pub mod handlers;
pub mod server;

pub use server::{WebApp, WebState};
