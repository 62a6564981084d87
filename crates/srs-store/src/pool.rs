//! Connection pool setup and migration runner, following the teacher
//! pack's `create_pool`/`run_migrations` split (e.g.
//! `iqrah-storage::content::repository`).

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Opens a SQLite pool at `database_url`, creating the database file if it
/// does not already exist. `database_url` may be `sqlite::memory:` for
/// tests — an in-memory database only exists on the connection that
/// created it, so the pool is capped at one connection in that case
/// (matching the pack's `SqlitePoolOptions::max_connections(1)` pattern
/// for in-memory test fixtures) rather than silently handing callers a
/// fresh, empty database on every second connection.
///
/// # Errors
///
/// Returns a `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options: SqliteConnectOptions = database_url.parse::<SqliteConnectOptions>()?.create_if_missing(true);
    let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Runs every pending migration under `migrations/`.
///
/// # Errors
///
/// Returns a `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
