//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGINT and SIGTERM listeners before collaborators start
//! - Translate either signal into a [`TerminationSignal`]
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe); no work runs inside a trap
//! - Signals delivered before anyone awaits are buffered, not lost

use std::fmt;
use std::io;

/// A termination request delivered by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    /// SIGINT (Ctrl + C).
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl TerminationSignal {
    /// Conventional signal number.
    pub fn signum(&self) -> i32 {
        match self {
            TerminationSignal::Interrupt => 2,
            TerminationSignal::Terminate => 15,
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => f.write_str("SIGINT"),
            TerminationSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Registered termination listeners.
#[cfg(unix)]
pub struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    /// Install the listeners. Must be called from within a Tokio runtime.
    pub fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let interrupt = signal(SignalKind::interrupt())?;
        let terminate = signal(SignalKind::terminate())?;
        tracing::debug!("Termination signal handlers registered");
        Ok(Self { interrupt, terminate })
    }

    /// Wait for the next termination signal.
    pub async fn recv(&mut self) -> TerminationSignal {
        tokio::select! {
            _ = self.interrupt.recv() => TerminationSignal::Interrupt,
            _ = self.terminate.recv() => TerminationSignal::Terminate,
        }
    }
}

/// Registered termination listeners.
#[cfg(not(unix))]
pub struct Signals {
    _private: (),
}

#[cfg(not(unix))]
impl Signals {
    /// Only Ctrl + C is available off Unix.
    pub fn register() -> io::Result<Self> {
        Ok(Self { _private: () })
    }

    /// Wait for the next termination signal.
    pub async fn recv(&mut self) -> TerminationSignal {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to listen for Ctrl + C");
            std::future::pending::<()>().await;
        }
        TerminationSignal::Interrupt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_numbers() {
        assert_eq!(TerminationSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(TerminationSignal::Terminate.signum(), 15);
    }
}
