use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::{ApiError, MeasurementTable};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/temperatura", post(handler))
}

#[derive(Debug, Deserialize)]
struct TemperatureInput {
    valor: f64,
}

#[derive(Debug, Serialize)]
struct Stored {
    sucesso: bool,
    id: i64,
}

/// Any numeric temperature is accepted.
async fn handler(
    State(state): State<AppState>,
    Json(input): Json<TemperatureInput>,
) -> Result<Json<Stored>, ApiError> {
    // ---
    info!("POST /api/temperatura valor={}", input.valor);

    let id = state
        .store
        .append(MeasurementTable::Temperature, input.valor, &state.clock.timestamp())
        .await
        .map_err(ApiError::store("save temperature"))?;

    Ok(Json(Stored { sucesso: true, id }))
}
