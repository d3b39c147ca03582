use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

use super::{AppState, Listing};
use crate::store::Order;
use crate::{ApiError, MeasurementTable};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/custos", get(handler))
}

#[derive(Debug, Serialize)]
struct CostRow {
    dados: f64,
    data: String,
}

async fn handler(State(state): State<AppState>) -> Result<Json<Listing<CostRow>>, ApiError> {
    // ---
    info!("GET /api/custos");

    let rows = state
        .store
        .list(MeasurementTable::Cost, Order::NewestFirst)
        .await
        .map_err(ApiError::store("read costs"))?
        .into_iter()
        .map(|row| CostRow {
            dados: row.value,
            data: row.timestamp,
        })
        .collect();

    Listing::non_empty(rows, "cost data")
}
