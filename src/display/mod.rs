//! Display application server.
//!
//! # Data Flow
//! ```text
//! Presenter agent (TCP)
//!     → server.rs (accept loop, connection limit)
//!     → connection.rs (frame loop per agent)
//!     → codec.rs (length-prefixed frames)
//!     → channel.rs (registry shared with the web UI)
//! ```

pub mod channel;
pub mod codec;
pub mod connection;
pub mod server;

pub use channel::{ChannelRegistry, ChannelStats};
pub use server::{DisplayServer, RunningDisplay};
