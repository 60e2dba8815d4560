//! Backup, restore and import of the live SQLite database
//!
//! Exports are point-in-time copies taken with `VACUUM INTO`. Imports run
//! in two phases: [`validate_candidate`] reads the candidate file through a
//! read-only connection, then [`apply_snapshot`] writes its rows into the
//! live database inside one transaction. [`BackupService`] sequences both
//! with a safety export in between and serializes concurrent imports.

pub mod apply;
pub mod candidate;
pub mod error;
pub mod service;

pub use apply::apply_snapshot;
pub use candidate::{read_table_counts, validate_candidate, CandidateSnapshot};
pub use error::BackupError;
pub use service::{BackupService, BackupSettings};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How candidate rows are combined with the live data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStrategy {
    /// Keep live rows, overwrite rows with colliding ids, add the rest
    #[default]
    Merge,
    /// Delete every live row of the backed-up tables first
    Replace,
}

impl FromStr for ImportStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merge" => Ok(ImportStrategy::Merge),
            "replace" => Ok(ImportStrategy::Replace),
            other => Err(format!(
                "unknown strategy '{other}', expected \"merge\" or \"replace\""
            )),
        }
    }
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStrategy::Merge => f.write_str("merge"),
            ImportStrategy::Replace => f.write_str("replace"),
        }
    }
}

/// Row counts for the three backed-up tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub users: u64,
    pub calculators: u64,
    pub lessons: u64,
}

impl TableCounts {
    pub fn total(&self) -> u64 {
        self.users + self.calculators + self.lessons
    }
}

/// Phases an import moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Validating,
    SafetyBackupInProgress,
    Transacting,
    Committed,
    Aborted,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::Validating => "validating",
            ImportStage::SafetyBackupInProgress => "safety_backup",
            ImportStage::Transacting => "transacting",
            ImportStage::Committed => "committed",
            ImportStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// A backup file on disk
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupArtifact {
    pub file_name: String,
    pub file_path: PathBuf,
    pub size: u64,
    pub created: DateTime<Utc>,
}

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub file_path: PathBuf,
    pub file_name: String,
    /// Timestamp embedded in the file name
    pub timestamp: String,
}

/// Result of a successful import
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub strategy: ImportStrategy,
    pub counts: TableCounts,
    /// Snapshot of the live database taken right before the import
    pub backup_file_path: PathBuf,
}

impl ImportReport {
    pub fn message(&self) -> String {
        format!(
            "Import completed successfully. Imported {} users, {} calculators, and {} lessons.",
            self.counts.users, self.counts.calculators, self.counts.lessons
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("merge".parse::<ImportStrategy>(), Ok(ImportStrategy::Merge));
        assert_eq!(
            "replace".parse::<ImportStrategy>(),
            Ok(ImportStrategy::Replace)
        );
        assert!("Merge".parse::<ImportStrategy>().is_err());
        assert!("".parse::<ImportStrategy>().is_err());
        assert_eq!(ImportStrategy::default(), ImportStrategy::Merge);
    }

    #[test]
    fn test_strategy_display_matches_parse() {
        for strategy in [ImportStrategy::Merge, ImportStrategy::Replace] {
            assert_eq!(strategy.to_string().parse::<ImportStrategy>(), Ok(strategy));
        }
    }

    #[test]
    fn test_table_counts_total() {
        let counts = TableCounts {
            users: 3,
            calculators: 2,
            lessons: 9,
        };
        assert_eq!(counts.total(), 14);
        assert_eq!(TableCounts::default().total(), 0);
    }

    #[test]
    fn test_import_report_message() {
        let report = ImportReport {
            strategy: ImportStrategy::Merge,
            counts: TableCounts {
                users: 3,
                calculators: 0,
                lessons: 1,
            },
            backup_file_path: PathBuf::from("/tmp/x.db"),
        };
        assert_eq!(
            report.message(),
            "Import completed successfully. Imported 3 users, 0 calculators, and 1 lessons."
        );
    }
}
