//! Backend for the environmental and energy monitoring dashboard.
//!
//! Modules follow the Explicit Module Boundary Pattern (EMBP): each sibling
//! owns one concern, and the items other modules need are re-exported here so
//! that `routes/*.rs` only ever import from the crate root.
//!
//! - `config`    – environment-driven `Config`
//! - `clock`     – timestamp source for every stored row
//! - `schema`    – idempotent table creation and room seeding
//! - `store`     – the shared SQLite handle and its queries
//! - `accrual`   – timer-driven cost and consumption derivation
//! - `aggregate` – combined latest-data snapshot
//! - `auth`      – registration, login, and tokens
//! - `routes`    – the HTTP gateway

use std::sync::Arc;

pub mod accrual;
pub mod aggregate;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;

pub use accrual::AccrualJob;
pub use auth::Authenticator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::ApiError;
pub use models::MeasurementTable;
pub use routes::AppState;
pub use store::Store;

// ---

/// Wire the request-handling state from its owned parts.
pub fn app_state(store: Store, clock: Arc<dyn Clock>, config: &Config) -> AppState {
    // ---
    let auth = Authenticator::new(
        store.clone(),
        clock.clone(),
        &config.jwt_secret,
        config.token_ttl_hours,
        config.bcrypt_cost,
    );
    AppState { store, clock, auth }
}
