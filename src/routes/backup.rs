use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use crate::backup::{BackupArtifact, BackupError, ImportReport, ImportStrategy, TableCounts};
use crate::constants::*;
use crate::error::{AppError, Result};
use crate::routes::AdminAccess;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_counts: Option<TableCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_file_path: Option<String>,
}

impl ImportResponse {
    /// Translate an import outcome into a status code and response body
    pub fn from_result(result: std::result::Result<ImportReport, BackupError>) -> (StatusCode, Self) {
        match result {
            Ok(report) => (
                StatusCode::OK,
                ImportResponse {
                    success: true,
                    message: report.message(),
                    imported_counts: Some(report.counts),
                    backup_file_path: Some(report.backup_file_path.display().to_string()),
                },
            ),
            Err(e) => {
                let status = if e.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (
                    status,
                    ImportResponse {
                        success: false,
                        message: e.to_string(),
                        imported_counts: None,
                        backup_file_path: e.backup_path().map(|p| p.display().to_string()),
                    },
                )
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatusResponse {
    pub current_database: TableCounts,
    pub recent_backups: Vec<BackupArtifact>,
    pub total_backups: usize,
}

#[derive(Debug, Deserialize)]
pub struct DeleteBackupParams {
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteBackupResponse {
    pub message: String,
}

/// Create a backup of the live database and download it
///
/// POST /api/admin/backup/export
pub async fn export_backup(_admin: AdminAccess, State(state): State<AppState>) -> Result<Response> {
    let report = state.backups.export_database().await?;
    let bytes = tokio::fs::read(&report.file_path).await?;

    tracing::info!(
        "Backup exported for download: {} ({} bytes)",
        report.file_name,
        bytes.len()
    );

    let disposition = format!("attachment; filename=\"{}\"", report.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Import an uploaded backup file into the live database
///
/// POST /api/admin/backup/import (multipart: `backupFile`, `strategy`)
///
/// The upload is staged in a temporary file which is removed when the
/// request finishes, whatever the outcome.
pub async fn import_backup(
    _admin: AdminAccess,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>)> {
    let mut upload: Option<Bytes> = None;
    let mut strategy_field: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(IMPORT_FILE_FIELD) => upload = Some(field.bytes().await?),
            Some(IMPORT_STRATEGY_FIELD) => strategy_field = Some(field.text().await?),
            _ => {}
        }
    }

    let Some(data) = upload else {
        return Err(AppError::InvalidInput(ERR_NO_BACKUP_FILE.to_string()));
    };

    let strategy = match strategy_field.as_deref().map(str::trim) {
        None | Some("") => ImportStrategy::default(),
        Some(value) => value
            .parse::<ImportStrategy>()
            .map_err(|_| AppError::InvalidInput(ERR_INVALID_STRATEGY.to_string()))?,
    };

    tracing::info!(
        "Backup upload received: {} bytes, strategy {}",
        data.len(),
        strategy
    );

    let staged = stage_upload(state.config.temp_dir.clone(), data).await?;
    let result = state.backups.import_database(staged.path(), strategy).await;

    // Removes the staged file
    drop(staged);

    let (status, body) = ImportResponse::from_result(result);
    Ok((status, Json(body)))
}

/// Write an uploaded file to a uniquely named temp file
async fn stage_upload(temp_dir: PathBuf, data: Bytes) -> Result<NamedTempFile> {
    let staged = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        std::fs::create_dir_all(&temp_dir)?;
        let mut file = tempfile::Builder::new()
            .prefix("temp_backup_")
            .suffix(".db")
            .tempfile_in(&temp_dir)?;
        file.write_all(&data)?;
        file.flush()?;
        Ok(file)
    })
    .await??;

    Ok(staged)
}

/// Live row counts and the most recent backups
///
/// GET /api/admin/backup/status
pub async fn backup_status(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Json<BackupStatusResponse> {
    let backups = state.backups.list_backups().await;
    let current_database = state.backups.database_stats().await;
    let total_backups = backups.len();

    Json(BackupStatusResponse {
        current_database,
        recent_backups: backups.into_iter().take(RECENT_BACKUPS_LIMIT).collect(),
        total_backups,
    })
}

/// Delete a backup artifact
///
/// DELETE /api/admin/backup/delete?fileName=<name>
pub async fn delete_backup(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Query(params): Query<DeleteBackupParams>,
) -> Result<Json<DeleteBackupResponse>> {
    let file_name = params
        .file_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::InvalidInput(ERR_FILE_NAME_REQUIRED.to_string()))?;

    if !state.backups.delete_backup(&file_name).await {
        return Err(AppError::NotFound(
            "Failed to delete backup file".to_string(),
        ));
    }

    Ok(Json(DeleteBackupResponse {
        message: "Backup deleted successfully".to_string(),
    }))
}
