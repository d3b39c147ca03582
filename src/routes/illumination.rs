//! Illumination readings.
//!
//! The write path ignores any request body: the value is derived from the
//! newest lamps-on count times a factor of 10 or 8, picked at random per call.

use axum::{extract::State, routing::get, Json, Router};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use super::AppState;
use crate::store::Order;
use crate::{ApiError, MeasurementTable};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/iluminacao", get(list).post(record))
}

#[derive(Debug, Serialize)]
struct IlluminationPoint {
    name: String,
    valor: f64,
}

#[derive(Debug, Serialize)]
struct Recorded {
    sucesso: bool,
    iluminacao: f64,
}

/// Readings oldest first, labelled `Leitura 1`, `Leitura 2`, ...
async fn list(State(state): State<AppState>) -> Result<Json<Vec<IlluminationPoint>>, ApiError> {
    // ---
    info!("GET /api/iluminacao");

    let rows = state
        .store
        .list(MeasurementTable::Illumination, Order::OldestFirst)
        .await
        .map_err(ApiError::store("read illumination"))?;

    let points = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| IlluminationPoint {
            name: format!("Leitura {}", i + 1),
            valor: row.value,
        })
        .collect();

    Ok(Json(points))
}

async fn record(State(state): State<AppState>) -> Result<Json<Recorded>, ApiError> {
    // ---
    let lamps_on = state
        .store
        .latest(MeasurementTable::LampsOn)
        .await
        .map_err(ApiError::store("read lamps-on"))?
        .map_or(0.0, |m| m.value);

    let factor = illumination_factor(&mut rand::rng());
    let value = lamps_on * factor;
    info!("POST /api/iluminacao lamps_on={} factor={} value={}", lamps_on, factor, value);

    state
        .store
        .append(MeasurementTable::Illumination, value, &state.clock.timestamp())
        .await
        .map_err(ApiError::store("save illumination"))?;

    Ok(Json(Recorded {
        sucesso: true,
        iluminacao: value,
    }))
}

/// 10 or 8 with equal probability.
fn illumination_factor<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.random_bool(0.5) {
        10.0
    } else {
        8.0
    }
}
