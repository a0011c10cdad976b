use axum::{extract::State, Json};
use serde::Serialize;

use crate::collaborator::AppType;
use crate::display::ChannelStats;
use crate::web::server::WebState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub app: AppType,
    pub channels: usize,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_status(State(state): State<WebState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        app: state.app_type,
        channels: state.registry.len(),
    })
}

pub async fn get_channels(State(state): State<WebState>) -> Json<Vec<ChannelStats>> {
    Json(state.registry.snapshot())
}
