//! Presenter Server Library
//!
//! Launches an application server and a web UI for one application type,
//! refuses to run twice, and stops both in order on SIGINT/SIGTERM.

pub mod cli;
pub mod collaborator;
pub mod config;
pub mod display;
pub mod lifecycle;
pub mod observability;
pub mod web;

pub use cli::Cli;
pub use collaborator::{AppServer, AppType, Collaborators, RunningServer, WebServer};
pub use config::ServerConfig;
pub use lifecycle::{launch, Launcher, RunOutcome};
