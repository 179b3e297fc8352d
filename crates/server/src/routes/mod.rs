//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                   - Index page
//! GET  /health             - Liveness check
//! GET  /health/ready       - Readiness check (probes the database)
//! GET  /orders/{order_uid} - JSON order lookup
//! POST /orders             - Feed a raw payload into the ingestion channel
//! ```

pub mod orders;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(orders::index))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/orders", post(orders::ingest))
        .route("/orders/{order_uid}", get(orders::show))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
