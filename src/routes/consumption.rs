use axum::{extract::State, routing::get, Json, Router};
use chrono::DateTime;
use serde::Serialize;
use tracing::info;

use super::{AppState, Listing};
use crate::store::Order;
use crate::{ApiError, MeasurementTable};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/consumo", get(handler))
}

/// One chart point: the reading's day and its consumption.
#[derive(Debug, Serialize)]
struct ConsumptionPoint {
    name: String,
    consumo: f64,
}

async fn handler(State(state): State<AppState>) -> Result<Json<Listing<ConsumptionPoint>>, ApiError> {
    // ---
    info!("GET /api/consumo");

    let rows = state
        .store
        .list(MeasurementTable::Consumption, Order::NewestFirst)
        .await
        .map_err(ApiError::store("read consumption"))?;

    let points = rows
        .into_iter()
        .map(|row| ConsumptionPoint {
            name: day_label(&row.timestamp),
            consumo: row.value,
        })
        .collect();

    Listing::non_empty(points, "consumption data")
}

/// `dd/mm/yyyy` in UTC. Unparseable timestamps are passed through as-is.
fn day_label(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|at| at.naive_utc().format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_day_label() {
        // ---
        assert_eq!(day_label("2024-10-14T03:37:58.123Z"), "14/10/2024");
        assert_eq!(day_label("2024-01-05T23:59:59.000-03:00"), "06/01/2024");
        assert_eq!(day_label("not a date"), "not a date");
    }
}
