use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Storage backend in use (`memory` or `postgres`).
    pub store: &'static str,
    /// Whether the store is reachable.
    pub store_healthy: bool,
}

/// GET /health -- returns service and store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = state.registry.health_check().await.is_ok();

    let status = if store_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store: state.registry.backend(),
        store_healthy,
    })
}

/// Mount health check routes (intended for root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
