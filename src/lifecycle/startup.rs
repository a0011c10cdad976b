//! Startup orchestration.
//!
//! # Responsibilities
//! - Refuse to start when the same application type is already running
//! - Register termination listeners before anything is started
//! - Hand the collaborators to a [`Launcher`] and serve until signalled
//!
//! # Design Decisions
//! - Fail fast: config and lock errors are fatal
//! - A duplicate instance is an expected condition, not an error

use std::io;

use thiserror::Error;

use crate::collaborator::{AppType, Collaborators};
use crate::config::{ConfigError, ServerConfig};
use crate::lifecycle::instance::{check_already_running, InstanceCheck};
use crate::lifecycle::launcher::{Launcher, RunOutcome};
use crate::lifecycle::signals::Signals;

/// Fatal launcher errors.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("instance check failed: {0}")]
    InstanceCheck(#[source] io::Error),

    #[error("failed to register signal handlers: {0}")]
    Signal(#[source] io::Error),
}

/// Message printed when a server of the same type is already active.
pub fn already_running_message(app_type: AppType) -> String {
    format!("Presenter Server type \"{}\" already exist!", app_type)
}

/// Run a presenter server of `app_type` with the default collaborators.
pub async fn launch(app_type: AppType, config: &ServerConfig) -> Result<RunOutcome, LauncherError> {
    launch_with(app_type, config, Collaborators::for_app(app_type, config)).await
}

/// Run a presenter server with the given collaborators.
pub async fn launch_with(
    app_type: AppType,
    config: &ServerConfig,
    collaborators: Collaborators,
) -> Result<RunOutcome, LauncherError> {
    let _guard = match check_already_running(app_type, &config.instance)
        .await
        .map_err(LauncherError::InstanceCheck)?
    {
        InstanceCheck::Clear(guard) => guard,
        InstanceCheck::AlreadyRunning => {
            println!("{}", already_running_message(app_type));
            return Ok(RunOutcome::AlreadyRunning);
        }
    };

    let mut signals = Signals::register().map_err(LauncherError::Signal)?;

    let launcher = Launcher::new(app_type, collaborators);
    Ok(launcher.run_until(signals.recv()).await)
}
