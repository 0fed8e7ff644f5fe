/// Embedded schema migrations
///
/// The SQL files under `agriscan-shared/migrations/` are compiled into the
/// binary, so the server and worker bring their own schema wherever they run.
/// Both processes call [`run_migrations`] at startup; applying them twice is a
/// no-op.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::SqlitePool;
use tracing::{error, info};

/// Every migration this build knows about
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies pending migrations
///
/// # Errors
///
/// A failed migration is fatal; callers abort startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await.map_err(|e| {
        error!(error = %e, "Schema migration failed");
        e
    })?;

    info!(schema_version = ?latest_known_version(), "Schema up to date");
    Ok(())
}

/// Version of the newest successfully applied migration
///
/// `None` on a database that has never been migrated.
pub async fn schema_version(pool: &SqlitePool) -> Result<Option<i64>, sqlx::Error> {
    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    if tables == 0 {
        return Ok(None);
    }

    sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
}

/// Version of the newest migration embedded in this build
pub fn latest_known_version() -> Option<i64> {
    MIGRATOR.iter().map(|m| m.version).max()
}
