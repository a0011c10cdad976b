//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Instance check → Register signals → Launcher
//!
//! Launcher (launcher.rs):
//!     app.run() → web.start() → wait for signal → web.stop() → handle.stop()
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → TerminationSignal
//!
//! Instance (instance.rs):
//!     lock file (default) or `ps -ef` scan
//! ```
//!
//! # Design Decisions
//! - Ordered startup: application server first, web UI last
//! - Ordered shutdown: web UI first, application server last
//! - Collaborator tasks stop through the shared `Shutdown` coordinator

pub mod instance;
pub mod launcher;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use launcher::{Launcher, RunOutcome, StartOutcome};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::{Signals, TerminationSignal};
pub use startup::{launch, launch_with, LauncherError};
