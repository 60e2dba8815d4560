use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::routes::AdminAccess;
use crate::user_export::{fetch_signups, generate_csv, generate_excel_csv};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportUsersParams {
    /// `csv` (default), or `excel`/`xlsx` for a BOM-prefixed CSV
    pub format: Option<String>,
}

/// Download customer emails and signup dates as CSV
///
/// GET /api/admin/users/export?format=csv|excel
pub async fn export_users(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Query(params): Query<ExportUsersParams>,
) -> Result<Response> {
    let rows = fetch_signups(&state.db).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound("No users found to export".to_string()));
    }

    let body = match params.format.as_deref() {
        Some("excel") | Some("xlsx") => generate_excel_csv(&rows),
        _ => generate_csv(&rows).into_bytes(),
    };

    let file_name = format!("users_export_{}.csv", Utc::now().format("%Y-%m-%d"));
    tracing::info!("Exported {} users to {}", rows.len(), file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response())
}
