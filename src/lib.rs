//! ZeroFinanx Server Library
//!
//! Waitlist and beta signup API, admin exports, and backup/restore of the
//! SQLite database. Exported for the binaries and for testing.

pub mod backup;
pub mod config;
pub mod constants;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod routes;
pub mod security;
pub mod user_export;

pub use backup::{BackupError, BackupService, BackupSettings, ImportStrategy};
pub use config::Config;
pub use db::{open_database, Db};
pub use email::Mailer;
pub use error::{AppError, Result};

use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub backups: Arc<BackupService>,
    pub mailer: Mailer,
}

impl AppState {
    /// Create a new AppState with the given database and configuration
    pub fn new(db: Db, config: Config) -> Self {
        let backups = BackupService::new(
            db.clone(),
            BackupSettings {
                backup_dir: config.backup_dir.clone(),
                file_prefix: config.backup_file_prefix.clone(),
            },
        );
        let mailer = Mailer::new(config.sendgrid_api_key.clone(), config.email_from.clone());

        Self {
            db,
            config,
            backups: Arc::new(backups),
            mailer,
        }
    }
}
