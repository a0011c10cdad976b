//! Collaborator contracts and the application-type lookup.
//!
//! # Data Flow
//! ```text
//! --app display
//!     → AppType::Display
//!     → Collaborators::for_app (static, exhaustive)
//!     → { web: WebApp, app: DisplayServer }
//! ```
//!
//! # Design Decisions
//! - The launcher only sees the traits below, never concrete servers
//! - Adding an application type is a compile error until it is mapped

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::Serialize;

use crate::config::ServerConfig;
use crate::display::{ChannelRegistry, DisplayServer};
use crate::web::WebApp;

/// Application type served by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    /// Image display for presenter agents.
    Display,
}

impl AppType {
    /// Tag used on the command line, in lock file names and in process scans.
    pub fn tag(&self) -> &'static str {
        match self {
            AppType::Display => "display",
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The application (socket) side of a presenter server.
#[async_trait]
pub trait AppServer: Send + Sync {
    /// Start serving. `None` means the server could not be started.
    async fn run(&self) -> Option<Box<dyn RunningServer>>;
}

/// Handle to a started application server.
#[async_trait]
pub trait RunningServer: Send + Sync {
    /// Stop the server and wait for its tasks to finish.
    async fn stop(self: Box<Self>);
}

/// The web UI side of a presenter server.
#[async_trait]
pub trait WebServer: Send + Sync {
    /// Start the web UI. Returns whether it is serving.
    async fn start(&self) -> bool;

    /// Stop the web UI. Calling it when not started is a no-op.
    async fn stop(&self);
}

/// The pair of collaborators the launcher sequences.
pub struct Collaborators {
    pub web: Box<dyn WebServer>,
    pub app: Box<dyn AppServer>,
}

impl Collaborators {
    pub fn new(web: Box<dyn WebServer>, app: Box<dyn AppServer>) -> Self {
        Self { web, app }
    }

    /// Build the collaborators for an application type.
    pub fn for_app(app_type: AppType, config: &ServerConfig) -> Self {
        match app_type {
            AppType::Display => {
                let registry = Arc::new(ChannelRegistry::new());
                let app = DisplayServer::new(config.display.clone(), Arc::clone(&registry));
                let web = WebApp::new(config.web.clone(), app_type, registry);
                Self::new(Box::new(web), Box::new(app))
            }
        }
    }
}
