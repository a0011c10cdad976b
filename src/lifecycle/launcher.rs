//! Launcher context: sequences the two collaborators.
//!
//! # Responsibilities
//! - Start the application server, then the web UI
//! - Stop the web UI, then the application server
//! - Turn one termination signal into one stop sequence

use std::future::Future;

use crate::collaborator::{AppType, Collaborators, RunningServer};
use crate::lifecycle::signals::TerminationSignal;

/// Outcome of [`Launcher::start_application`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Both collaborators are serving.
    Started,
    /// The application server produced no handle; the web UI was not started.
    StartupAborted,
    /// The web UI failed to start; the application server was stopped again.
    WebFailed,
}

/// Outcome of a whole launcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another instance of the same type was already active.
    AlreadyRunning,
    StartupAborted,
    WebFailed,
    /// Served until the given signal, then stopped cleanly.
    Stopped(TerminationSignal),
}

/// State for a single presenter-server run.
pub struct Launcher {
    app_type: AppType,
    collaborators: Collaborators,
    running: Option<Box<dyn RunningServer>>,
}

impl Launcher {
    pub fn new(app_type: AppType, collaborators: Collaborators) -> Self {
        Self {
            app_type,
            collaborators,
            running: None,
        }
    }

    /// Whether the application server handle is held.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start the application server, then the web UI.
    pub async fn start_application(&mut self) -> StartOutcome {
        let Some(running) = self.collaborators.app.run().await else {
            tracing::error!(app = %self.app_type, "Application server failed to start");
            return StartOutcome::StartupAborted;
        };
        self.running = Some(running);

        tracing::info!(app = %self.app_type, "presenter server starting, type: {}", self.app_type);

        if self.collaborators.web.start().await {
            StartOutcome::Started
        } else {
            tracing::error!(app = %self.app_type, "Web UI failed to start");
            if let Some(running) = self.running.take() {
                running.stop().await;
            }
            StartOutcome::WebFailed
        }
    }

    /// Stop the web UI, then the application server. Runs at most once.
    pub async fn stop_application(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        self.collaborators.web.stop().await;
        running.stop().await;
    }

    /// Log the signal and run the stop sequence.
    pub async fn handle_termination_signal(&mut self, signal: TerminationSignal) {
        tracing::info!(signal = %signal, signum = signal.signum(), "Received termination signal");
        self.stop_application().await;
        tracing::info!(app = %self.app_type, "presenter server exit by {}", signal);
    }

    /// Start both collaborators and serve until `termination` resolves.
    pub async fn run_until<F>(mut self, termination: F) -> RunOutcome
    where
        F: Future<Output = TerminationSignal>,
    {
        match self.start_application().await {
            StartOutcome::Started => {}
            StartOutcome::StartupAborted => return RunOutcome::StartupAborted,
            StartOutcome::WebFailed => return RunOutcome::WebFailed,
        }

        let signal = termination.await;
        self.handle_termination_signal(signal).await;
        RunOutcome::Stopped(signal)
    }
}
