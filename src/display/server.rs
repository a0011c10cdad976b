//! Agent-facing TCP server.
//!
//! # Responsibilities
//! - Bind the configured address
//! - Accept agent connections, bounded by `max_connections`
//! - Stop accepting and drain connection tasks on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};

use crate::collaborator::{AppServer, RunningServer};
use crate::config::DisplayConfig;
use crate::display::channel::ChannelRegistry;
use crate::display::connection::AgentConnection;
use crate::lifecycle::{Shutdown, ShutdownSignal};

/// The display application server.
pub struct DisplayServer {
    config: DisplayConfig,
    registry: Arc<ChannelRegistry>,
}

impl DisplayServer {
    pub fn new(config: DisplayConfig, registry: Arc<ChannelRegistry>) -> Self {
        Self { config, registry }
    }

    /// Bind and start the accept loop.
    pub async fn start(&self) -> std::io::Result<RunningDisplay> {
        let listener = TcpListener::bind(&self.config.bind_address).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!(
            address = %local_addr,
            max_connections = self.config.max_connections,
            "Display server listening"
        );

        let shutdown = Shutdown::new();
        let accept_loop = AcceptLoop {
            listener,
            connection_limit: Arc::new(Semaphore::new(self.config.max_connections)),
            registry: Arc::clone(&self.registry),
            max_frame_bytes: self.config.max_frame_bytes,
            idle_timeout: Duration::from_millis(self.config.idle_timeout_ms),
        };
        let task = tokio::spawn(accept_loop.run(shutdown.subscribe()));

        Ok(RunningDisplay {
            local_addr,
            shutdown,
            task,
            registry: Arc::clone(&self.registry),
        })
    }
}

#[async_trait]
impl AppServer for DisplayServer {
    async fn run(&self) -> Option<Box<dyn RunningServer>> {
        match self.start().await {
            Ok(running) => Some(Box::new(running)),
            Err(e) => {
                tracing::error!(
                    address = %self.config.bind_address,
                    error = %e,
                    "Display server failed to bind"
                );
                None
            }
        }
    }
}

/// Handle to a started display server.
pub struct RunningDisplay {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<()>,
    registry: Arc<ChannelRegistry>,
}

impl RunningDisplay {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, wait for connection tasks, and forget all channels.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Display accept loop panicked");
        }
        self.registry.clear();
        tracing::info!(address = %self.local_addr, "Display server stopped");
    }
}

#[async_trait]
impl RunningServer for RunningDisplay {
    async fn stop(self: Box<Self>) {
        (*self).shutdown().await;
    }
}

struct AcceptLoop {
    listener: TcpListener,
    connection_limit: Arc<Semaphore>,
    registry: Arc<ChannelRegistry>,
    max_frame_bytes: usize,
    idle_timeout: Duration,
}

impl AcceptLoop {
    async fn run(self, mut shutdown: ShutdownSignal) {
        let mut connections = JoinSet::new();

        loop {
            // Acquire the permit first so a full server stops accepting (backpressure).
            let permit = tokio::select! {
                _ = shutdown.recv() => break,
                permit = Arc::clone(&self.connection_limit).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (stream, peer) = tokio::select! {
                _ = shutdown.recv() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept agent connection");
                        continue;
                    }
                },
            };

            let conn = AgentConnection::new(
                peer,
                Arc::clone(&self.registry),
                self.max_frame_bytes,
                self.idle_timeout,
            );
            let id = conn.id();
            tracing::debug!(
                connection_id = %id,
                peer_addr = %peer,
                available_permits = self.connection_limit.available_permits(),
                "Agent connected"
            );

            let conn_shutdown = shutdown.clone();
            connections.spawn(async move {
                if let Err(e) = conn.serve(stream, conn_shutdown).await {
                    tracing::warn!(connection_id = %id, error = %e, "Agent connection closed with error");
                }
                tracing::debug!(connection_id = %id, "Agent disconnected");
                drop(permit);
            });

            // Reap finished tasks so the set does not grow unbounded.
            while connections.try_join_next().is_some() {}
        }

        drop(self.listener);
        while connections.join_next().await.is_some() {}
    }
}
