//! Presenter Server
//!
//! ```text
//! presenter-server --app display
//!     → instance check (lock file or ps scan)
//!     → signals registered
//!     → display server (agents, :7006) → web UI (:7007)
//!     → SIGINT/SIGTERM → web UI stop → display stop → exit
//! ```

use std::process::ExitCode;

use clap::Parser;

use presenter_server::config::load_or_default;
use presenter_server::observability::init_logging;
use presenter_server::{launch, Cli, RunOutcome};

#[tokio::main]
async fn main() -> ExitCode {
    // Exits with usage and a non-zero status on a bad selector.
    let cli = Cli::parse();

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("presenter-server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging);
    tracing::debug!(app = %cli.app, ?config, "Configuration loaded");

    match launch(cli.app, &config).await {
        Ok(RunOutcome::Stopped(_)) | Ok(RunOutcome::AlreadyRunning) => ExitCode::SUCCESS,
        Ok(outcome) => {
            tracing::warn!(?outcome, "presenter server did not start");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "presenter server failed");
            ExitCode::FAILURE
        }
    }
}
