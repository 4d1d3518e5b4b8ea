/// Database connection pool management
///
/// Thin wrapper around `sqlx::PgPoolOptions` that connects, verifies
/// connectivity once, and hands the pool to the store adapters. Store calls
/// are bounded by the pool's acquire timeout; nothing above this layer
/// configures timeouts of its own.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// Creates and health-checks a PostgreSQL connection pool
///
/// # Errors
///
/// Returns an error if the URL is invalid, the database is unreachable, or
/// the initial health check fails.
pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Some(Duration::from_secs(600)))
        .connect(url)
        .await?;

    // Fail fast on an unreachable database rather than at first request
    sqlx::query("SELECT 1").execute(&pool).await?;

    info!(max_connections, "Database pool ready");

    Ok(pool)
}
