use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

use super::candidate::count_tables;
use super::{
    apply_snapshot, validate_candidate, BackupArtifact, BackupError, ExportReport, ImportReport,
    ImportStage, ImportStrategy, TableCounts,
};
use crate::constants::BACKUP_EXTENSION;
use crate::db::Db;

/// `2024-06-01T12-30-45-123Z`: ISO-8601 with `:` and `.` made filename safe
const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

/// Attempts at finding an unused artifact name before giving up
const MAX_NAME_ATTEMPTS: usize = 50;

/// Where backup artifacts live and how they are named
#[derive(Debug, Clone)]
pub struct BackupSettings {
    pub backup_dir: PathBuf,
    pub file_prefix: String,
}

/// Export, import, list and delete backups of the live database
pub struct BackupService {
    db: Db,
    settings: BackupSettings,
    /// Held for the whole of an import, from validation to commit
    import_lock: Mutex<()>,
    /// Held from picking an artifact name until the snapshot is written
    export_lock: Mutex<()>,
}

impl BackupService {
    pub fn new(db: Db, settings: BackupSettings) -> Self {
        Self {
            db,
            settings,
            import_lock: Mutex::new(()),
            export_lock: Mutex::new(()),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.settings.backup_dir
    }

    /// Snapshot the live database into a new timestamped artifact
    ///
    /// Uses `VACUUM INTO`, which reads from a single consistent transaction,
    /// so writes in flight never produce a torn copy. Concurrent exports
    /// run one after another, so each gets its own artifact.
    pub async fn export_database(&self) -> Result<ExportReport, BackupError> {
        let _guard = self.export_lock.lock().await;

        tokio::fs::create_dir_all(&self.settings.backup_dir)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create backup directory {:?}: {}",
                    self.settings.backup_dir,
                    e
                );
                e
            })?;

        let (timestamp, file_name, file_path) = self.next_artifact_path().await?;

        let target = file_path.to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "backup path is not valid UTF-8",
            )
        })?;

        sqlx::query("VACUUM INTO ?")
            .bind(target)
            .execute(&self.db)
            .await
            .map_err(|e| {
                tracing::error!("Backup to {:?} failed: {}", file_path, e);
                e
            })?;

        tracing::info!("Database backed up to: {:?}", file_path);

        Ok(ExportReport {
            file_path,
            file_name,
            timestamp,
        })
    }

    async fn next_artifact_path(&self) -> io::Result<(String, String, PathBuf)> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let timestamp = Utc::now().format(ARTIFACT_TIMESTAMP_FORMAT).to_string();
            let file_name = format!(
                "{}_backup_{}.{}",
                self.settings.file_prefix, timestamp, BACKUP_EXTENSION
            );
            let file_path = self.settings.backup_dir.join(&file_name);

            if !tokio::fs::try_exists(&file_path).await? {
                return Ok((timestamp, file_name, file_path));
            }

            // Same millisecond as an existing artifact
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "could not find an unused backup file name",
        ))
    }

    /// Import a candidate database file into the live database
    ///
    /// The live database is only touched after a safety export succeeded,
    /// and the write itself is a single transaction. Imports are serialized.
    pub async fn import_database(
        &self,
        path: &Path,
        strategy: ImportStrategy,
    ) -> Result<ImportReport, BackupError> {
        let _guard = self.import_lock.lock().await;

        tracing::info!(
            "Import of {:?} ({}): {}",
            path,
            strategy,
            ImportStage::Validating
        );
        let snapshot = validate_candidate(path).await.map_err(|e| {
            tracing::warn!("Import {}: {}", ImportStage::Aborted, e);
            e
        })?;

        tracing::info!(
            "Import of {:?}: {} ({} rows to import)",
            path,
            ImportStage::SafetyBackupInProgress,
            snapshot.counts().total()
        );
        let safety = self.export_database().await.map_err(|e| {
            tracing::error!("Import {}: safety backup failed: {}", ImportStage::Aborted, e);
            BackupError::SafetyBackupFailed(Box::new(e))
        })?;

        tracing::info!("Import of {:?}: {}", path, ImportStage::Transacting);
        match apply_snapshot(&self.db, &snapshot, strategy).await {
            Ok(counts) => {
                tracing::info!(
                    "Import of {:?}: {} ({:?}), original data saved to {:?}",
                    path,
                    ImportStage::Committed,
                    counts,
                    safety.file_path
                );
                Ok(ImportReport {
                    strategy,
                    counts,
                    backup_file_path: safety.file_path,
                })
            }
            Err(e) => {
                tracing::error!(
                    "Import {}: transaction rolled back: {}. Original data saved to {:?}",
                    ImportStage::Aborted,
                    e,
                    safety.file_path
                );
                Err(BackupError::TransactionFailed {
                    message: e.to_string(),
                    backup_path: safety.file_path,
                })
            }
        }
    }

    /// Backup artifacts in the backup directory, newest first
    ///
    /// A missing or unreadable directory yields an empty list.
    pub async fn list_backups(&self) -> Vec<BackupArtifact> {
        match self.read_artifacts().await {
            Ok(artifacts) => artifacts,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::error!("Error listing backups: {}", e);
                }
                Vec::new()
            }
        }
    }

    async fn read_artifacts(&self) -> io::Result<Vec<BackupArtifact>> {
        let mut entries = tokio::fs::read_dir(&self.settings.backup_dir).await?;
        let mut artifacts = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_path = entry.path();
            if !has_backup_extension(&file_path) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", file_path, e);
                    continue;
                }
            };

            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);

            artifacts.push(BackupArtifact {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                file_path,
                size: metadata.len(),
                created: DateTime::<Utc>::from(created),
            });
        }

        // Names embed the creation timestamp, so they break ties
        artifacts.sort_by(|a, b| {
            b.created
                .cmp(&a.created)
                .then_with(|| b.file_name.cmp(&a.file_name))
        });

        Ok(artifacts)
    }

    /// Delete a backup artifact by file name
    ///
    /// Only plain `.db` file names resolving to a file directly inside the
    /// backup directory are accepted. Returns whether a file was deleted.
    pub async fn delete_backup(&self, file_name: &str) -> bool {
        if !is_artifact_file_name(file_name) {
            tracing::warn!("Refusing to delete backup with invalid name: {:?}", file_name);
            return false;
        }

        let candidate = self.settings.backup_dir.join(file_name);

        let (backup_dir, file_path) = match (
            tokio::fs::canonicalize(&self.settings.backup_dir).await,
            tokio::fs::canonicalize(&candidate).await,
        ) {
            (Ok(dir), Ok(path)) => (dir, path),
            _ => return false,
        };

        if file_path.parent() != Some(backup_dir.as_path()) || !has_backup_extension(&file_path) {
            tracing::warn!("Refusing to delete {:?}: outside backup directory", file_path);
            return false;
        }

        match tokio::fs::metadata(&file_path).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => return false,
        }

        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => {
                tracing::info!("Deleted backup {:?}", file_path);
                true
            }
            Err(e) => {
                tracing::error!("Error deleting backup {:?}: {}", file_path, e);
                false
            }
        }
    }

    /// Current row counts of the live database; zeros if they cannot be read
    pub async fn database_stats(&self) -> TableCounts {
        match self.live_counts().await {
            Ok(counts) => counts,
            Err(e) => {
                tracing::error!("Error getting database stats: {}", e);
                TableCounts::default()
            }
        }
    }
}

impl BackupService {
    async fn live_counts(&self) -> Result<TableCounts, sqlx::Error> {
        let mut conn = self.db.acquire().await?;
        count_tables(&mut conn).await
    }
}

fn has_backup_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(BACKUP_EXTENSION)
}

/// A bare file name with the artifact extension and no path components
fn is_artifact_file_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && !file_name.starts_with('.')
        && !file_name.contains(['/', '\\', '\0'])
        && !file_name.contains("..")
        && Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name)
        && has_backup_extension(Path::new(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_file_name_validation() {
        assert!(is_artifact_file_name(
            "zerofinanx_backup_2024-06-01T12-30-45-123Z.db"
        ));
        assert!(is_artifact_file_name("manual.db"));

        // Wrong or missing extension
        assert!(!is_artifact_file_name("notes.txt"));
        assert!(!is_artifact_file_name("backup.db-wal"));
        assert!(!is_artifact_file_name("backup"));

        // Traversal attempts
        assert!(!is_artifact_file_name("../zerofinanx.db"));
        assert!(!is_artifact_file_name("..\\zerofinanx.db"));
        assert!(!is_artifact_file_name("/etc/passwd.db"));
        assert!(!is_artifact_file_name("nested/backup.db"));
        assert!(!is_artifact_file_name("..db"));

        // Empty and hidden
        assert!(!is_artifact_file_name(""));
        assert!(!is_artifact_file_name(".db"));
    }

    #[test]
    fn test_timestamp_format_is_filename_safe() {
        let ts = Utc::now().format(ARTIFACT_TIMESTAMP_FORMAT).to_string();
        assert!(!ts.contains(':'));
        assert!(!ts.contains('.'));
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-06-01T12-30-45-123Z".len());
    }
}
