//! Web UI server.
//!
//! # Responsibilities
//! - Create the Axum router with status handlers
//! - Bind on `start`, serve in a background task
//! - Graceful shutdown on `stop`

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::collaborator::{AppType, WebServer};
use crate::config::WebConfig;
use crate::display::ChannelRegistry;
use crate::lifecycle::Shutdown;
use crate::web::handlers;

/// State injected into handlers.
#[derive(Clone)]
pub struct WebState {
    pub app_type: AppType,
    pub registry: Arc<ChannelRegistry>,
}

struct Serving {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<()>,
}

/// Web UI collaborator.
pub struct WebApp {
    config: WebConfig,
    state: WebState,
    serving: Mutex<Option<Serving>>,
}

impl WebApp {
    pub fn new(config: WebConfig, app_type: AppType, registry: Arc<ChannelRegistry>) -> Self {
        Self {
            config,
            state: WebState { app_type, registry },
            serving: Mutex::new(None),
        }
    }

    /// Build the Axum router.
    pub fn router(state: WebState) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/status", get(handlers::get_status))
            .route("/api/channels", get(handlers::get_channels))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Address the UI is bound to, while serving.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.serving.lock().await.as_ref().map(|s| s.local_addr)
    }
}

#[async_trait]
impl WebServer for WebApp {
    async fn start(&self) -> bool {
        let mut serving = self.serving.lock().await;
        if serving.is_some() {
            return true;
        }

        let listener = match TcpListener::bind(&self.config.bind_address).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(address = %self.config.bind_address, error = %e, "Web UI failed to bind");
                return false;
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                tracing::error!(error = %e, "Web UI listener has no local address");
                return false;
            }
        };

        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        let app = Self::router(self.state.clone());

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.recv().await })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Web UI server error");
            }
        });

        tracing::info!(address = %local_addr, "Web UI listening");
        *serving = Some(Serving {
            local_addr,
            shutdown,
            task,
        });
        true
    }

    async fn stop(&self) {
        let Some(serving) = self.serving.lock().await.take() else {
            return;
        };
        serving.shutdown.trigger();
        if let Err(e) = serving.task.await {
            tracing::error!(error = %e, "Web UI task panicked");
        }
        tracing::info!(address = %serving.local_addr, "Web UI stopped");
    }
}
