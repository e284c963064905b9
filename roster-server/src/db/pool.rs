//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::DbError;
use crate::config::PostgresSettings;

/// How long a request waits for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a PostgreSQL connection pool and check it answers.
///
/// # Errors
///
/// Returns [`DbError::Config`] for unusable settings and
/// [`DbError::Postgres`] if the server can't be reached.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&PostgresSettings::from_url("postgres://localhost/roster")).await?;
/// ```
pub async fn create_pool(settings: &PostgresSettings) -> Result<PgPool, DbError> {
    let options = settings.connect_options()?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(DbError::postgres("connect"))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DbError::postgres("ping"))?;

    tracing::info!(
        max_connections = settings.max_connections,
        "Connected to PostgreSQL"
    );

    Ok(pool)
}
