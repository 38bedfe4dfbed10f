//! Connection pool construction and migration runner.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::error::DbError;

/// Connect to Postgres with sensible pool defaults.
pub async fn connect(database_url: &str) -> Result<PgPool, DbError> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(DbError::ConnectionFailed)
}

/// Run all pending database migrations.
///
/// Migrations are embedded at compile time from the `migrations/` directory
/// and applied in filename order.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(DbError::MigrationFailed)?;

    tracing::info!("Migrations completed");
    Ok(())
}
