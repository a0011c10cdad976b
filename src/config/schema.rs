//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the presenter server.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults so an empty file is a valid config.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Largest frame the display server will ever accept, regardless of config.
pub const FRAME_LIMIT_CEILING: usize = 64 * 1024 * 1024;

/// Root configuration for the presenter server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Agent-facing socket server.
    pub display: DisplayConfig,

    /// Web UI server.
    pub web: WebConfig,

    /// Duplicate-instance detection.
    pub instance: InstanceConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Display (agent socket) server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Bind address (e.g., "127.0.0.1:7006").
    pub bind_address: String,

    /// Maximum concurrent agent connections (backpressure).
    pub max_connections: usize,

    /// Maximum payload size of a single frame (length prefix excluded).
    pub max_frame_bytes: usize,

    /// Close an agent connection after this long without any frame.
    /// Agents send a heartbeat every 1.5 s.
    pub idle_timeout_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:7006".to_string(),
            max_connections: 64,
            max_frame_bytes: 10 * 1024 * 1024,
            idle_timeout_ms: 6_000,
        }
    }
}

/// Web UI configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address (e.g., "127.0.0.1:7007").
    pub bind_address: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:7007".to_string(),
        }
    }
}

/// How a running instance of the same type is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStrategy {
    /// Exclusive lock file per application type.
    #[default]
    Lock,
    /// Scan the OS process listing (`ps -ef`).
    ProcessScan,
}

/// Duplicate-instance detection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstanceConfig {
    pub strategy: InstanceStrategy,

    /// Directory for lock files. Defaults to the OS temp dir.
    pub lock_dir: Option<PathBuf>,

    /// Word that identifies this server in a process listing.
    pub process_marker: String,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            strategy: InstanceStrategy::Lock,
            lock_dir: None,
            process_marker: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl InstanceConfig {
    /// Resolved lock directory.
    pub fn lock_dir(&self) -> PathBuf {
        self.lock_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}
