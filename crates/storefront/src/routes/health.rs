//! Health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness check.
///
/// # Route
///
/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness check.
///
/// Ready once the catalog fetch has completed, whether it succeeded or not;
/// a failed catalog is a page state, not an outage.
///
/// # Route
///
/// `GET /health/ready`
pub async fn ready(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.catalog().is_settled() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "loading")
    }
}
