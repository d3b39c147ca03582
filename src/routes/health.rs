// src/routes/health.rs
//! Liveness endpoint.
//!
//! Always answers 200 so orchestrators can tell the process is up; the
//! `store` field reports whether the database answered a trivial query.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: &'static str,
}

/// Handle `GET /health`.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    // ---
    let store = match state.store.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Health check could not reach store: {}", e);
            "unavailable"
        }
    };
    Json(HealthResponse { status: "ok", store })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
