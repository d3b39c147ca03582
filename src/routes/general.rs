use axum::{extract::State, routing::get, Json, Router};
use tracing::{debug, info};

use super::AppState;
use crate::aggregate::{latest_snapshot, Snapshot};
use crate::ApiError;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/general/latest-data", get(handler))
}

async fn handler(State(state): State<AppState>) -> Result<Json<Snapshot>, ApiError> {
    // ---
    info!("GET /api/general/latest-data");

    let snapshot = latest_snapshot(&state.store)
        .await
        .map_err(ApiError::store("build latest snapshot"))?;

    debug!("Latest snapshot: {:?}", snapshot);
    Ok(Json(snapshot))
}
