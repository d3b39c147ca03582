//! Database schema management for `energy-monitor`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::SqlitePool;

use crate::models::MeasurementTable;

// ---

/// Rooms inserted by [`seed_rooms`] into an empty `comodos` table.
pub const DEFAULT_ROOMS: [&str; 5] = ["Sala de Estar", "Cozinha", "Quarto", "Banheiro", "Escritório"];

/// Create the database schema (idempotent).
///
/// Creates one `(id, dados, data)` table per measurement kind, the static
/// reference tables, and the auth accounts table. Safe to call on every
/// startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Technicians, read-only through the API
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS usuarios (
            Nome      TEXT,
            Ocupacao  TEXT,
            Email     TEXT,
            Status    TEXT
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comodos (
            comodos   TEXT
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    for table in MeasurementTable::ALL {
        let name = table.table_name();
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {name} (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                dados     {kind},
                data      TEXT
            );
            "#,
            kind = table.column_type(),
        ))
        .execute(&mut *tx)
        .await?;

        // Latest-value reads order by timestamp
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{name}_data ON {name} (data);"
        ))
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS auth_users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT UNIQUE NOT NULL,
            email       TEXT UNIQUE NOT NULL,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Insert [`DEFAULT_ROOMS`] when `comodos` is empty. Returns rows inserted.
pub async fn seed_rooms(pool: &SqlitePool) -> Result<usize> {
    // ---
    let mut tx = pool.begin().await?;

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comodos")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        tracing::debug!("Skipping room seed, {} rooms already present", existing);
        return Ok(0);
    }

    for room in DEFAULT_ROOMS {
        sqlx::query("INSERT INTO comodos (comodos) VALUES (?)")
            .bind(room)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!("Seeded {} default rooms", DEFAULT_ROOMS.len());
    Ok(DEFAULT_ROOMS.len())
}
