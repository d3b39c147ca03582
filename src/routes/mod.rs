//! Routes gateway: owns the shared application state and merges every
//! resource subrouter into one `Router`.

use std::sync::Arc;

use axum::{Json, Router};
use serde::Serialize;

use crate::{ApiError, Authenticator, Clock, MeasurementTable, Store};

mod auth;
mod consumption;
mod costs;
mod general;
mod health;
mod illumination;
mod lamps;
mod occupancy;
mod rooms;
mod temperature;
mod users;

// ---

/// Handles shared by every request. Built once in `main` and cloned per
/// request by axum.
#[derive(Clone)]
pub struct AppState {
    // ---
    pub store: Store,
    pub clock: Arc<dyn Clock>,
    pub auth: Authenticator,
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(general::router())
        .merge(consumption::router())
        .merge(costs::router())
        .merge(temperature::router())
        .merge(illumination::router())
        .merge(lamps::router())
        .merge(occupancy::router())
        .merge(users::router())
        .merge(rooms::router())
        .merge(auth::router())
        .merge(health::router())
        .with_state(state)
}

// ---

/// Body of the `/ultimo` endpoints.
#[derive(Debug, Serialize)]
struct LatestReading {
    sucesso: bool,
    dados: f64,
    data: String,
}

/// Newest row of `table`, or 404 naming `what` when the table is empty.
async fn latest_reading(
    store: &Store,
    table: MeasurementTable,
    what: &str,
) -> Result<Json<LatestReading>, ApiError> {
    // ---
    let row = store
        .latest(table)
        .await
        .map_err(ApiError::store("read latest reading"))?
        .ok_or_else(|| ApiError::NotFound(format!("No {what} data found")))?;

    Ok(Json(LatestReading {
        sucesso: true,
        dados: row.value,
        data: row.timestamp,
    }))
}

/// Body of the list endpoints: `{ success, data }`.
#[derive(Debug, Serialize)]
struct Listing<T> {
    success: bool,
    data: Vec<T>,
}

impl<T> Listing<T> {
    /// 404 naming `what` when there is nothing to list.
    fn non_empty(data: Vec<T>, what: &str) -> Result<Json<Self>, ApiError> {
        if data.is_empty() {
            return Err(ApiError::NotFound(format!("No {what} found")));
        }
        Ok(Json(Listing {
            success: true,
            data,
        }))
    }
}

/// `{ success, id }` returned by the validated ingress endpoints.
#[derive(Debug, Serialize)]
struct Created {
    success: bool,
    id: i64,
}
