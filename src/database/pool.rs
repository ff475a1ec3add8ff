use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Build the process-wide connection pool and bring the schema up to date.
pub async fn connect() -> Result<PgPool, DatabaseError> {
    let url =
        std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

    let db = &config::config().database;
    let pool = PgPoolOptions::new()
        .max_connections(db.max_connections)
        .acquire_timeout(Duration::from_secs(db.connection_timeout_secs))
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database pool ready ({} max connections)", db.max_connections);

    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
