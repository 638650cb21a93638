//! Health check endpoint

use axum::{routing::get, Json, Router};
use judge_common::api::HealthResponse;

use crate::AppState;

/// GET /health
///
/// Health check endpoint for monitoring. Does NOT require authentication.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "judge-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
