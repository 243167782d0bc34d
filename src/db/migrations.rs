//! Embedded schema migrations.
//!
//! diesel_migrations drives a synchronous connection, so migrations run on a
//! blocking thread.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies all pending migrations and returns how many were run.
pub async fn run_migrations(database_url: &str) -> AppResult<usize> {
    let database_url = database_url.to_string();

    let applied = tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url).map_err(|e| AppError::Database {
            operation: "establish connection for migrations".to_string(),
            source: anyhow::anyhow!("Connection error: {}", e),
        })?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::Database {
                operation: "run pending migrations".to_string(),
                source: anyhow::anyhow!("Migration error: {}", e),
            })?;

        Ok::<_, AppError>(applied.len())
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })??;

    if applied > 0 {
        tracing::info!(applied, "Applied pending database migrations");
    } else {
        tracing::debug!("Database schema is up to date");
    }

    Ok(applied)
}
