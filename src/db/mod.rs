pub mod tables;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use sqlx::ConnectOptions;
use std::path::Path;
use std::time::Duration;

/// Database handle type (pool is cheaply cloneable across handlers)
pub type Db = SqlitePool;

/// Open or create the SQLite database at the given path
///
/// Creates the parent directory and runs all pending migrations.
pub async fn open_database(path: impl AsRef<Path>) -> anyhow::Result<Db> {
    let path = path.as_ref();
    tracing::info!("Opening database at: {:?}", path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                e
            })?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(10));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database initialized successfully");

    Ok(pool)
}

/// Open a standalone read-only connection to a database file
///
/// Never creates the file and never writes to it, nor to `-wal`/`-shm`
/// files beside it. Callers own the connection and must close it.
pub async fn open_read_only(path: impl AsRef<Path>) -> Result<SqliteConnection, sqlx::Error> {
    SqliteConnectOptions::new()
        .filename(path.as_ref())
        .read_only(true)
        .immutable(true)
        .create_if_missing(false)
        .connect()
        .await
}

/// Count rows in one of the known tables
pub async fn count_rows<'c, E>(executor: E, table: &str) -> Result<i64, sqlx::Error>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    // Table names come from `tables`, never from user input
    let sql = format!("SELECT COUNT(*) FROM {table}");
    sqlx::query_scalar::<_, i64>(&sql).fetch_one(executor).await
}
