use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::{AppState, Listing};
use crate::models::Room;
use crate::ApiError;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/rooms/get-rooms", get(handler))
}

async fn handler(State(state): State<AppState>) -> Result<Json<Listing<Room>>, ApiError> {
    // ---
    info!("GET /api/rooms/get-rooms");

    let rooms = state
        .store
        .rooms()
        .await
        .map_err(ApiError::store("read rooms"))?;

    Listing::non_empty(rooms, "rooms")
}
