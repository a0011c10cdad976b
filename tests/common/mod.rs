//! Shared spies and helpers for integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use presenter_server::config::ServerConfig;
use presenter_server::{AppServer, Collaborators, RunningServer, WebServer};

/// Ordered record of collaborator calls.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| **c == call).count()
    }
}

pub struct SpyApp {
    log: CallLog,
    succeed: bool,
}

pub struct SpyHandle {
    log: CallLog,
}

pub struct SpyWeb {
    log: CallLog,
    succeed: bool,
}

#[async_trait]
impl AppServer for SpyApp {
    async fn run(&self) -> Option<Box<dyn RunningServer>> {
        self.log.push("app.run");
        if self.succeed {
            Some(Box::new(SpyHandle { log: self.log.clone() }))
        } else {
            None
        }
    }
}

#[async_trait]
impl RunningServer for SpyHandle {
    async fn stop(self: Box<Self>) {
        self.log.push("app.stop");
    }
}

#[async_trait]
impl WebServer for SpyWeb {
    async fn start(&self) -> bool {
        self.log.push("web.start");
        self.succeed
    }

    async fn stop(&self) {
        self.log.push("web.stop");
    }
}

/// Spy collaborators sharing one call log.
pub fn spies(app_ok: bool, web_ok: bool) -> (Collaborators, CallLog) {
    let log = CallLog::default();
    let collaborators = Collaborators::new(
        Box::new(SpyWeb { log: log.clone(), succeed: web_ok }),
        Box::new(SpyApp { log: log.clone(), succeed: app_ok }),
    );
    (collaborators, log)
}

/// Config with ephemeral ports and a private lock directory.
#[allow(dead_code)]
pub fn test_config(lock_dir: &std::path::Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.display.bind_address = "127.0.0.1:0".into();
    config.web.bind_address = "127.0.0.1:0".into();
    config.instance.lock_dir = Some(lock_dir.to_path_buf());
    config
}
