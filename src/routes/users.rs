use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::{AppState, Listing};
use crate::models::Technician;
use crate::ApiError;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/users", get(handler))
}

async fn handler(State(state): State<AppState>) -> Result<Json<Listing<Technician>>, ApiError> {
    // ---
    info!("GET /api/users");

    let technicians = state
        .store
        .technicians()
        .await
        .map_err(ApiError::store("read technicians"))?;

    Listing::non_empty(technicians, "users")
}
