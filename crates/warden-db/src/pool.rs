//! Database connection pool

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::DbResult;

/// Database connection pool type alias
pub type DbPool = SqlitePool;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Pool tuning knobs
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// How long a writer waits on a locked database before failing
    pub busy_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 8,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Create a new database connection pool
pub async fn create_pool(database_url: &str) -> DbResult<DbPool> {
    create_pool_with_options(database_url, PoolOptions::default()).await
}

/// Create a pool for a file-backed database with explicit options
pub async fn create_pool_with_options(database_url: &str, options: PoolOptions) -> DbResult<DbPool> {
    let connect = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(options.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .acquire_timeout(options.acquire_timeout)
        .connect_with(connect)
        .await?;

    tracing::debug!(database_url, "SQLite pool connected");
    Ok(pool)
}

/// Create a migrated in-memory database.
///
/// Every SQLite connection to `:memory:` opens a separate database, so the
/// pool is pinned to a single connection that never expires.
pub async fn create_memory_pool() -> DbResult<DbPool> {
    let connect = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &DbPool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    tracing::debug!("Database migrations applied");
    Ok(())
}

/// Journal mode and schema version of a live database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    /// `wal` for file databases, `memory` for in-memory ones
    pub journal_mode: String,
    /// Highest successfully applied migration, 0 when none
    pub schema_version: i64,
    /// Highest migration embedded in this build
    pub latest_schema_version: i64,
}

impl StoreStatus {
    /// Whether every embedded migration has been applied
    pub fn is_current(&self) -> bool {
        self.schema_version >= self.latest_schema_version
    }
}

/// Read the journal mode and applied schema version
pub async fn store_status(pool: &DbPool) -> DbResult<StoreStatus> {
    let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(pool)
        .await?;

    let ledger_tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    let schema_version = if ledger_tables > 0 {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(version), 0) FROM _sqlx_migrations WHERE success = 1",
        )
        .fetch_one(pool)
        .await?
    } else {
        0
    };

    Ok(StoreStatus {
        journal_mode: journal_mode.to_lowercase(),
        schema_version,
        latest_schema_version: MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0),
    })
}
