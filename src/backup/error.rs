use std::path::{Path, PathBuf};
use thiserror::Error;

use super::ImportStage;

/// Failures surfaced by the backup service
///
/// Every variant leaves the live database as it was before the call.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid backup file: {0}")]
    InvalidFormat(String),

    #[error("Failed to create backup of current database: {0}")]
    SafetyBackupFailed(#[source] Box<BackupError>),

    /// The import transaction was rolled back
    #[error(
        "Import failed: {message}. Your original data has been backed up to: {}",
        .backup_path.display()
    )]
    TransactionFailed {
        message: String,
        backup_path: PathBuf,
    },

    #[error("Backup failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backup failed: {0}")]
    Snapshot(#[from] sqlx::Error),
}

impl BackupError {
    /// Path of the pre-import snapshot, when one was written
    pub fn backup_path(&self) -> Option<&Path> {
        match self {
            BackupError::TransactionFailed { backup_path, .. } => Some(backup_path),
            _ => None,
        }
    }

    /// Import stage the failure happened in
    ///
    /// `None` for `Io` and `Snapshot`, which only reach callers from a
    /// direct export; during an import they are wrapped in `SafetyBackupFailed`.
    pub fn stage(&self) -> Option<ImportStage> {
        match self {
            BackupError::NotFound(_) | BackupError::InvalidFormat(_) => {
                Some(ImportStage::Validating)
            }
            BackupError::SafetyBackupFailed(_) => Some(ImportStage::SafetyBackupInProgress),
            BackupError::TransactionFailed { .. } => Some(ImportStage::Transacting),
            BackupError::Io(_) | BackupError::Snapshot(_) => None,
        }
    }

    /// Whether the failure was caused by the candidate file rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, BackupError::NotFound(_) | BackupError::InvalidFormat(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_failure_mentions_backup_path() {
        let err = BackupError::TransactionFailed {
            message: "UNIQUE constraint failed: users.email".to_string(),
            backup_path: PathBuf::from("/data/backups/zerofinanx_backup_x.db"),
        };

        let message = err.to_string();
        assert!(message.contains("UNIQUE constraint failed"));
        assert!(message.contains("/data/backups/zerofinanx_backup_x.db"));
        assert_eq!(
            err.backup_path(),
            Some(Path::new("/data/backups/zerofinanx_backup_x.db"))
        );
        assert_eq!(err.stage(), Some(ImportStage::Transacting));
    }

    #[test]
    fn test_validation_errors_have_no_backup_path() {
        let err = BackupError::InvalidFormat("missing required tables: lessons".to_string());
        assert!(err.backup_path().is_none());
        assert!(err.is_client_error());
        assert_eq!(err.stage(), Some(ImportStage::Validating));

        let err = BackupError::SafetyBackupFailed(Box::new(BackupError::Io(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        )));
        assert!(err.backup_path().is_none());
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("read-only"));
        assert_eq!(err.stage(), Some(ImportStage::SafetyBackupInProgress));
    }

    #[test]
    fn test_direct_export_errors_have_no_import_stage() {
        let err = BackupError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.stage(), None);
        assert!(!err.is_client_error());
    }
}
