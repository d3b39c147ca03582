//! Reading store: the single SQLite handle shared by handlers and the
//! accrual job.
//!
//! Every operation is one parameterized statement; there are no
//! multi-statement transactions outside schema setup. Rows are never updated
//! or deleted. "Latest" always means the greatest timestamp string, with the
//! row id only breaking ties.

use std::str::FromStr;

use anyhow::{Context as _, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::models::{AuthAccount, Measurement, MeasurementTable, Room, Technician};
use crate::schema;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    OldestFirst,
    NewestFirst,
}

impl Order {
    const fn sql(self) -> &'static str {
        match self {
            Order::OldestFirst => "ASC",
            Order::NewestFirst => "DESC",
        }
    }
}

/// Cheap to clone; clones share the underlying pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    // ---
    /// Open (creating if missing) the SQLite database at `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        // ---
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url '{url}'"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database '{url}'"))?;

        Ok(Self { pool })
    }

    /// Private in-memory database with the schema applied.
    ///
    /// Pinned to one connection that never expires, since each SQLite
    /// in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        // ---
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        schema::create_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
    }

    // --- measurements

    /// Append one reading and return its row id.
    pub async fn append(
        &self,
        table: MeasurementTable,
        value: f64,
        timestamp: &str,
    ) -> Result<i64, sqlx::Error> {
        // ---
        let sql = format!("INSERT INTO {} (dados, data) VALUES (?, ?)", table.table_name());
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(timestamp)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// The row with the greatest timestamp, if any. Rows with no value are skipped.
    pub async fn latest(&self, table: MeasurementTable) -> Result<Option<Measurement>, sqlx::Error> {
        // ---
        let sql = format!(
            "SELECT id, CAST(dados AS REAL) AS value, data AS timestamp FROM {} \
             WHERE dados IS NOT NULL ORDER BY data DESC, id DESC LIMIT 1",
            table.table_name()
        );
        sqlx::query_as::<_, Measurement>(&sql)
            .fetch_optional(&self.pool)
            .await
    }

    /// Sum of every value ever stored; `0.0` for an empty table.
    pub async fn sum(&self, table: MeasurementTable) -> Result<f64, sqlx::Error> {
        // ---
        let sql = format!(
            "SELECT CAST(COALESCE(SUM(dados), 0) AS REAL) FROM {}",
            table.table_name()
        );
        let (total,): (f64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn list(
        &self,
        table: MeasurementTable,
        order: Order,
    ) -> Result<Vec<Measurement>, sqlx::Error> {
        // ---
        let sql = format!(
            "SELECT id, CAST(dados AS REAL) AS value, data AS timestamp FROM {} \
             WHERE dados IS NOT NULL ORDER BY data {dir}, id {dir}",
            table.table_name(),
            dir = order.sql(),
        );
        sqlx::query_as::<_, Measurement>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    // --- reference data

    pub async fn technicians(&self) -> Result<Vec<Technician>, sqlx::Error> {
        sqlx::query_as::<_, Technician>(
            "SELECT Nome AS name, Ocupacao AS role, Email AS email, Status AS status FROM usuarios",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn rooms(&self) -> Result<Vec<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>("SELECT comodos AS nome FROM comodos WHERE comodos IS NOT NULL")
            .fetch_all(&self.pool)
            .await
    }

    // --- auth accounts

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<AuthAccount>, sqlx::Error> {
        sqlx::query_as::<_, AuthAccount>(
            "SELECT id, username, email, password, created_at FROM auth_users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// True when either the username or the email is already registered.
    pub async fn account_exists(&self, username: &str, email: &str) -> Result<bool, sqlx::Error> {
        // ---
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM auth_users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn insert_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: &str,
    ) -> Result<i64, sqlx::Error> {
        // ---
        let result = sqlx::query(
            "INSERT INTO auth_users (username, email, password, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
