/// Database layer for AgriScan
///
/// # Modules
///
/// - `pool`: SQLite connection pool with health checks
/// - `migrations`: Embedded migration runner
///
/// # Example
///
/// ```no_run
/// use agriscan_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: "sqlite://agriscan_users.db".to_string(),
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;

/// Migrated single-connection in-memory pool for unit tests
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = pool::create_pool(pool::DatabaseConfig::in_memory())
        .await
        .expect("in-memory pool");
    migrations::run_migrations(&pool).await.expect("migrations");
    pool
}
