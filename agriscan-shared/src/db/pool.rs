/// SQLite connection pool
///
/// AgriScan keeps its single `users` table in one SQLite file. Every query
/// checks a connection out of the pool for its own duration only; nothing
/// holds a connection across requests.
///
/// File databases are opened in WAL mode with a busy timeout so the web
/// server and the alert worker can share the same file.
///
/// # Example
///
/// ```no_run
/// use agriscan_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::with_url("sqlite://agriscan_users.db")).await?;
///     Ok(())
/// }
/// ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// URL of a private in-memory database
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Pool settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `sqlite://path/to/file.db` or [`IN_MEMORY_URL`]
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// How long a query waits for a free connection
    pub acquire_timeout: Duration,

    /// How long SQLite waits on a locked database before failing
    pub busy_timeout: Duration,

    /// Create the file on first open
    pub create_if_missing: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://agriscan_users.db".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            create_if_missing: true,
        }
    }
}

impl DatabaseConfig {
    /// Default pool settings for the given URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Single-connection in-memory database, used by tests
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.to_string(),
            max_connections: 1,
            ..Default::default()
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Opens the pool and runs a `SELECT 1` against it
///
/// An in-memory database lives only as long as its connection, so for those
/// the pool keeps exactly one connection open for its whole lifetime.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the file cannot be opened, or the
/// health check fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = config.is_in_memory();

    info!(
        max_connections = config.max_connections,
        in_memory,
        "Opening SQLite database"
    );

    let mut connect_options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(config.create_if_missing)
        .busy_timeout(config.busy_timeout)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);

    if in_memory {
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
        pool_options = pool_options.max_connections(config.max_connections.max(1));
    }

    let pool = pool_options.connect_with(connect_options).await?;
    health_check(&pool).await?;

    debug!("SQLite pool ready");
    Ok(pool)
}

/// Verifies the database answers a trivial query
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let (one,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if one != 1 {
        return Err(sqlx::Error::Protocol(format!(
            "SELECT 1 returned {}",
            one
        )));
    }

    Ok(())
}

/// Closes every connection, waiting for checked-out ones to return
pub async fn close_pool(pool: SqlitePool) {
    pool.close().await;
    info!("SQLite pool closed");
}
