use std::sync::Arc;
use std::time::Instant;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

/// Shared application state for API handlers.
pub struct AppState {
    pub channels: Vec<String>,
    pub archive_enabled: bool,
    pub started_at: Instant,
}

/// Health/status routes merged with the transport's webhook router.
pub fn build_router(state: Arc<AppState>, webhook_router: Router) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(get_status))
        .with_state(state)
        .merge(webhook_router)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "wisemonk",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn get_status(axum::extract::State(state): axum::extract::State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "running",
        "channels": state.channels,
        "archive": state.archive_enabled,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}
