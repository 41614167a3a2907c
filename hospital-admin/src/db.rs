//! Database management for the admin console.
//!
//! Provides the shared connection pool injected into every store (sessions,
//! bills, departments, medicines, resources, staff).
//!
//! The database backend is selected at compile time via feature flags:
//! - `sqlite` (default): Uses SQLite
//! - `postgres`: Uses PostgreSQL

use crate::config::DatabaseConfig;
use crate::forms::LookupOption;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;
use sqlx::Row;
use tracing::info;

#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
#[cfg(feature = "sqlite")]
use std::str::FromStr;

#[cfg(feature = "postgres")]
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

// Re-export the pool and row types for the selected backend
#[cfg(feature = "sqlite")]
pub use sqlx::{SqlitePool as DbPool, sqlite::SqliteRow as DbRow};

#[cfg(feature = "postgres")]
pub use sqlx::{PgPool as DbPool, postgres::PgRow as DbRow};

/// Shared database for the admin console.
///
/// Owns the connection pool and applies migrations on startup. Created once
/// and handed to each store via [`Database::pool`].
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Connect (creating the SQLite file if needed) and run pending migrations.
    #[cfg(feature = "sqlite")]
    pub async fn new(config: &DatabaseConfig, data_dir: &Path) -> Result<Self> {
        use std::fs;

        let db_path = config
            .path
            .clone()
            .unwrap_or_else(|| data_dir.join("hospital.db"));

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Cascading deletes from "user" to doctor/nurse rely on enforced foreign keys
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        info!(backend = "sqlite", path = %db_path.display(), "Database connected");

        Ok(Self { pool })
    }

    /// Connect to PostgreSQL and run pending migrations.
    #[cfg(feature = "postgres")]
    pub async fn new(config: &DatabaseConfig, _data_dir: &Path) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("Failed to connect to PostgreSQL database")?;

        sqlx::migrate!("./migrations/postgres")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        info!(
            backend = "postgres",
            host = %config.host,
            port = config.port,
            user = %config.user,
            database = %config.database,
            "Database connected"
        );

        Ok(Self { pool })
    }

    /// Get a clone of the connection pool (internally Arc-based).
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

/// Timestamps are stored as fixed-width RFC 3339 text so they sort and
/// compare correctly as strings on both backends.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid timestamp: {raw}"))?
        .with_timezone(&Utc))
}

/// Load `(id, name)` pairs for a dropdown.
pub async fn lookup_options(pool: &DbPool, query: &str) -> Result<Vec<LookupOption>, sqlx::Error> {
    let rows = sqlx::query(query).fetch_all(pool).await?;

    rows.into_iter()
        .map(|row: DbRow| -> Result<LookupOption, sqlx::Error> {
            Ok(LookupOption {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            })
        })
        .collect()
}

/// Run a `SELECT COUNT(*) AS n` query.
pub async fn count(pool: &DbPool, query: &str) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(query).fetch_one(pool).await?;
    row.try_get("n")
}

/// Fresh SQLite database in a temporary directory, for store tests.
#[cfg(all(test, feature = "sqlite"))]
pub(crate) async fn test_pool() -> (tempfile::TempDir, DbPool) {
    let temp = tempfile::TempDir::new().unwrap();
    let db = Database::new(&DatabaseConfig::default(), temp.path())
        .await
        .unwrap();
    (temp, db.pool())
}

/// Insert a patient row directly; patients are maintained outside this console.
#[cfg(all(test, feature = "sqlite"))]
pub(crate) async fn insert_test_patient(pool: &DbPool, name: &str) -> i64 {
    sqlx::query("INSERT INTO patient (name, contact_info) VALUES (?, '') RETURNING patient_id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
        .get("patient_id")
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_connection() {
        let (_temp, pool) = test_pool().await;

        let row = sqlx::query("SELECT COUNT(*) AS n FROM bill")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>("n"), 0);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let at = DateTime::parse_from_rfc3339("2026-03-04T05:06:07Z")
            .unwrap()
            .with_timezone(&Utc);
        let text = format_timestamp(at);
        assert_eq!(text, "2026-03-04T05:06:07Z");
        assert_eq!(parse_timestamp(&text).unwrap(), at);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let (_temp, pool) = test_pool().await;

        let result = sqlx::query(
            "INSERT INTO bill (patient_id, amount_cents, description, status, bill_date) VALUES (999, 100, 'x', 'Unpaid', '2026-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}
