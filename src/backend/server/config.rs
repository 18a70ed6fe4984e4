/**
 * Database Configuration
 *
 * Opens the SQLite pool behind the user store and message log and brings
 * the schema up to date.
 *
 * # Connection Settings
 *
 * - `create_if_missing` so a fresh checkout starts without setup
 * - foreign keys on (messages reference users)
 * - a busy timeout, so a writer waits for the lock instead of failing
 *
 * Unlike the rest of the server, a database that cannot be opened or
 * migrated is fatal: every operation depends on it.
 */

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::backend::error::BackendResult;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect to `database_url` and run pending migrations
///
/// # Example
///
/// ```rust,no_run
/// use peerchat::backend::server::config::connect_database;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = connect_database("sqlite://peerchat.db", 8).await?;
/// # Ok(())
/// # }
/// ```
pub async fn connect_database(database_url: &str, max_connections: u32) -> BackendResult<SqlitePool> {
    tracing::info!("[Database] Connecting to {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// A private, migrated in-memory database
///
/// Each call returns an independent database. The pool holds exactly one
/// connection that is never recycled, since an in-memory SQLite database
/// lives only as long as its connection.
pub async fn connect_in_memory() -> BackendResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> BackendResult<()> {
    tracing::info!("[Database] Running migrations...");
    sqlx::migrate!().run(pool).await?;
    tracing::info!("[Database] Migrations complete");
    Ok(())
}
