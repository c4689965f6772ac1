//! Schema migrations embedded from the workspace `migrations/` directory

use sqlx::PgPool;
use tracing::info;

use crate::error::DatabaseError;

/// Applies every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    info!("Running database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

    info!("Database migrations completed");
    Ok(())
}
