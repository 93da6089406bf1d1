//! Common routes: health, readiness, status.

use crate::handlers::status::{health, ready, status};
use crate::state::AppState;
use axum::{routing::get, Router};

/// GET /health, GET /ready (repository ping), GET /status.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/status", get(status))
        .with_state(state)
}
