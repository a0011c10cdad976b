//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --config presenter.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → section clones handed to each collaborator
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{DisplayConfig, InstanceConfig, InstanceStrategy, LoggingConfig, ServerConfig, WebConfig};
