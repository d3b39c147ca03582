use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::{latest_reading, AppState, Created, LatestReading};
use crate::models::LAMPS_ON_RANGE;
use crate::{ApiError, MeasurementTable};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/lampadas-ligadas", post(record))
        .route("/api/lampadas-ligadas/ultimo", get(latest))
}

#[derive(Debug, Deserialize)]
struct LampsInput {
    valor: i64,
}

async fn record(
    State(state): State<AppState>,
    Json(input): Json<LampsInput>,
) -> Result<Json<Created>, ApiError> {
    // ---
    info!("POST /api/lampadas-ligadas valor={}", input.valor);

    if !LAMPS_ON_RANGE.contains(&input.valor) {
        return Err(ApiError::Validation(format!(
            "Lamps-on value must be between {} and {}",
            LAMPS_ON_RANGE.start(),
            LAMPS_ON_RANGE.end()
        )));
    }

    let id = state
        .store
        .append(MeasurementTable::LampsOn, input.valor as f64, &state.clock.timestamp())
        .await
        .map_err(ApiError::store("save lamps-on"))?;

    Ok(Json(Created { success: true, id }))
}

async fn latest(State(state): State<AppState>) -> Result<Json<LatestReading>, ApiError> {
    // ---
    info!("GET /api/lampadas-ligadas/ultimo");
    latest_reading(&state.store, MeasurementTable::LampsOn, "lamps-on").await
}
