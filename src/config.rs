use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_BACKUP_FILE_PREFIX, DEFAULT_MAX_IMPORT_SIZE_BYTES};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: PathBuf,
    pub backup_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub backup_file_prefix: String,
    pub max_import_size_bytes: usize,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    /// Admin endpoints are disabled when this is unset
    pub admin_secret_key: Option<String>,
    /// Emails are skipped (and logged) when this is unset
    pub sendgrid_api_key: Option<String>,
    pub email_from: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3003".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "./data/zerofinanx.db".to_string())
            .into();

        let backup_dir = env::var("BACKUP_DIR")
            .unwrap_or_else(|_| "./data/backups".to_string())
            .into();

        let temp_dir = env::var("TEMP_DIR")
            .unwrap_or_else(|_| "./data/temp".to_string())
            .into();

        let backup_file_prefix = env::var("BACKUP_FILE_PREFIX")
            .unwrap_or_else(|_| DEFAULT_BACKUP_FILE_PREFIX.to_string());

        let max_import_size_bytes = match env::var("MAX_IMPORT_SIZE_BYTES") {
            Ok(v) => v.parse().map_err(|_| "Invalid MAX_IMPORT_SIZE_BYTES")?,
            Err(_) => DEFAULT_MAX_IMPORT_SIZE_BYTES,
        };

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3003".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let admin_secret_key = env::var("ADMIN_SECRET_KEY").ok().filter(|k| !k.is_empty());
        let sendgrid_api_key = env::var("SENDGRID_API_KEY").ok().filter(|k| !k.is_empty());

        let email_from =
            env::var("EMAIL_FROM").unwrap_or_else(|_| "hello@zerofinanx.com".to_string());

        Ok(Config {
            server_host,
            server_port,
            database_path,
            backup_dir,
            temp_dir,
            backup_file_prefix,
            max_import_size_bytes,
            allowed_origins,
            environment,
            admin_secret_key,
            sendgrid_api_key,
            email_from,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
