use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use std::path::{Path, PathBuf};

use super::{BackupError, TableCounts};
use crate::db::{self, tables};
use crate::models::{Calculator, Customer, Lesson};

/// Rows read from a validated candidate file
#[derive(Debug, Clone)]
pub struct CandidateSnapshot {
    pub path: PathBuf,
    pub customers: Vec<Customer>,
    pub calculators: Vec<Calculator>,
    pub lessons: Vec<Lesson>,
}

impl CandidateSnapshot {
    pub fn counts(&self) -> TableCounts {
        TableCounts {
            users: self.customers.len() as u64,
            calculators: self.calculators.len() as u64,
            lessons: self.lessons.len() as u64,
        }
    }
}

/// Validate a candidate backup file and load its rows
///
/// The file is opened read-only and the connection is closed before this
/// returns, whatever the outcome. Nothing is written anywhere.
pub async fn validate_candidate(path: &Path) -> Result<CandidateSnapshot, BackupError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => {
            return Err(BackupError::InvalidFormat(
                "path is not a regular file".to_string(),
            ))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BackupError::NotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(BackupError::InvalidFormat(format!(
                "cannot read file: {e}"
            )))
        }
    }

    let mut conn = db::open_read_only(path)
        .await
        .map_err(|e| BackupError::InvalidFormat(format!("cannot open database: {e}")))?;

    let result = read_snapshot(&mut conn, path).await;

    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close candidate connection for {:?}: {}", path, e);
    }

    result
}

async fn read_snapshot(
    conn: &mut SqliteConnection,
    path: &Path,
) -> Result<CandidateSnapshot, BackupError> {
    let present: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN (?, ?, ?)",
    )
    .bind(tables::USERS)
    .bind(tables::CALCULATORS)
    .bind(tables::LESSONS)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| BackupError::InvalidFormat(format!("cannot read database: {e}")))?;

    let missing: Vec<&str> = tables::BACKUP_TABLES
        .iter()
        .copied()
        .filter(|table| !present.iter().any(|name| name == table))
        .collect();

    if !missing.is_empty() {
        return Err(BackupError::InvalidFormat(format!(
            "missing required tables: {}",
            missing.join(", ")
        )));
    }

    let customers = sqlx::query_as::<_, Customer>("SELECT * FROM users")
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| unreadable_rows(tables::USERS, e))?;

    let calculators = sqlx::query_as::<_, Calculator>("SELECT * FROM calculators")
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| unreadable_rows(tables::CALCULATORS, e))?;

    let lessons = sqlx::query_as::<_, Lesson>("SELECT * FROM lessons")
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| unreadable_rows(tables::LESSONS, e))?;

    let snapshot = CandidateSnapshot {
        path: path.to_path_buf(),
        customers,
        calculators,
        lessons,
    };

    tracing::debug!(
        "Candidate {:?} validated: {:?}",
        snapshot.path,
        snapshot.counts()
    );

    Ok(snapshot)
}

fn unreadable_rows(table: &str, e: sqlx::Error) -> BackupError {
    BackupError::InvalidFormat(format!("cannot read rows of table '{table}': {e}"))
}

/// Count the backed-up tables of a database file without modifying it
pub async fn read_table_counts(path: &Path) -> Result<TableCounts, sqlx::Error> {
    let mut conn = db::open_read_only(path).await?;

    let counts = count_tables(&mut conn).await;

    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close connection for {:?}: {}", path, e);
    }

    counts
}

pub(crate) async fn count_tables(conn: &mut SqliteConnection) -> Result<TableCounts, sqlx::Error> {
    Ok(TableCounts {
        users: db::count_rows(&mut *conn, tables::USERS).await? as u64,
        calculators: db::count_rows(&mut *conn, tables::CALCULATORS).await? as u64,
        lessons: db::count_rows(&mut *conn, tables::LESSONS).await? as u64,
    })
}
