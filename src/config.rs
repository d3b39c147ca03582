//! Configuration loader for the `energy-monitor` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Handlers and the accrual job receive a `Config`
//! snapshot and never read the environment themselves.
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

pub const DEFAULT_DATABASE_URL: &str = "sqlite://localDatabase.db";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// SQLite connection string. The file is created when missing.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// HTTP listen port.
    pub port: u16,

    /// HMAC secret used to sign auth tokens.
    pub jwt_secret: String,

    /// Lifetime of an issued auth token, in hours.
    pub token_ttl_hours: u32,

    /// bcrypt work factor for stored passwords.
    pub bcrypt_cost: u32,

    /// Seconds between accrual cycles.
    pub accrual_interval_secs: u32,

    /// Seed the default room list into an empty `comodos` table.
    pub seed_rooms: bool,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `JWT_SECRET` – auth token signing secret
///
/// Optional:
/// - `DATABASE_URL` – SQLite connection string (default: `sqlite://localDatabase.db`)
/// - `DB_POOL_MAX` – max DB connections (default: 1)
/// - `PORT` – listen port (default: 4000)
/// - `TOKEN_TTL_HOURS` – token lifetime (default: 24)
/// - `BCRYPT_COST` – password hashing cost (default: 10)
/// - `ACCRUAL_INTERVAL_SECS` – accrual cadence (default: 60)
/// - `SEED_ROOMS` – `1|true|yes` to seed rooms (default: off)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let jwt_secret = require_env!("JWT_SECRET");
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 1);
    let port = parse_env_u32!("PORT", 4000);
    let token_ttl_hours = parse_env_u32!("TOKEN_TTL_HOURS", 24);
    let bcrypt_cost = parse_env_u32!("BCRYPT_COST", 10);
    let accrual_interval_secs = parse_env_u32!("ACCRUAL_INTERVAL_SECS", 60);

    let port = u16::try_from(port).map_err(|_| anyhow!("Invalid PORT: {} is out of range", port))?;
    if db_pool_max == 0 {
        return Err(anyhow!("Invalid DB_POOL_MAX: must be at least 1"));
    }
    if accrual_interval_secs == 0 {
        return Err(anyhow!("Invalid ACCRUAL_INTERVAL_SECS: must be at least 1"));
    }
    if !(4..=31).contains(&bcrypt_cost) {
        return Err(anyhow!("Invalid BCRYPT_COST: {} is outside 4..=31", bcrypt_cost));
    }

    let seed_rooms = matches!(
        env::var("SEED_ROOMS").as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    );

    Ok(Config {
        db_url,
        db_pool_max,
        port,
        jwt_secret,
        token_ttl_hours,
        bcrypt_cost,
        accrual_interval_secs,
        seed_rooms,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// The signing secret is never printed; only its length is shown.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL          : {}", self.db_url);
        tracing::info!("  DB_POOL_MAX           : {}", self.db_pool_max);
        tracing::info!("  PORT                  : {}", self.port);
        tracing::info!("  JWT_SECRET            : **** ({} bytes)", self.jwt_secret.len());
        tracing::info!("  TOKEN_TTL_HOURS       : {}", self.token_ttl_hours);
        tracing::info!("  BCRYPT_COST           : {}", self.bcrypt_cost);
        tracing::info!("  ACCRUAL_INTERVAL_SECS : {}", self.accrual_interval_secs);
        tracing::info!("  SEED_ROOMS            : {}", self.seed_rooms);
    }
}
