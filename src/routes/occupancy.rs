use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::{latest_reading, AppState, Created, LatestReading};
use crate::models::OCCUPANCY_RANGE;
use crate::{ApiError, MeasurementTable};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/ocupacao", post(record))
        .route("/api/ocupacao/ultimo", get(latest))
}

#[derive(Debug, Deserialize)]
struct OccupancyInput {
    valor: i64,
}

/// Occupancy starts at 1, unlike lamps-on.
async fn record(
    State(state): State<AppState>,
    Json(input): Json<OccupancyInput>,
) -> Result<Json<Created>, ApiError> {
    // ---
    info!("POST /api/ocupacao valor={}", input.valor);

    if !OCCUPANCY_RANGE.contains(&input.valor) {
        return Err(ApiError::Validation(format!(
            "Occupancy value must be between {} and {}",
            OCCUPANCY_RANGE.start(),
            OCCUPANCY_RANGE.end()
        )));
    }

    let id = state
        .store
        .append(MeasurementTable::Occupancy, input.valor as f64, &state.clock.timestamp())
        .await
        .map_err(ApiError::store("save occupancy"))?;

    Ok(Json(Created { success: true, id }))
}

async fn latest(State(state): State<AppState>) -> Result<Json<LatestReading>, ApiError> {
    // ---
    info!("GET /api/ocupacao/ultimo");
    latest_reading(&state.store, MeasurementTable::Occupancy, "occupancy").await
}
