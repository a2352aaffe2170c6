//! GET /health - liveness probe

use axum::{Json, response::IntoResponse, routing::get};
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;

/// Always returns 200 OK while the process is alive.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "docqa-gateway" }))
}

pub fn health_router() -> axum::Router<Arc<AppState>> {
    axum::Router::new().route("/health", get(health))
}
