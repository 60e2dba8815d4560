use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::constants::{ERR_EMAIL_REQUIRED, ERR_INVALID_EMAIL};
use crate::error::{AppError, Result};
use crate::models::{BetaSignup, Customer};
use crate::security::verify_admin_key;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddBetaUserRequest {
    pub email: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBetaUserResponse {
    pub message: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<i64>,
}

/// Grant beta access to an email address
///
/// Protected by the admin secret sent in the request body. Existing
/// customers are left untouched.
pub async fn add_beta_user(
    State(state): State<AppState>,
    Json(payload): Json<AddBetaUserRequest>,
) -> Result<Json<AddBetaUserResponse>> {
    let admin_key = state
        .config
        .admin_secret_key
        .as_deref()
        .ok_or(AppError::Unauthorized)?;

    match payload.secret.as_deref() {
        Some(secret) if verify_admin_key(secret, admin_key) => {}
        _ => {
            tracing::warn!("Invalid secret on add-beta-user");
            return Err(AppError::Unauthorized);
        }
    }

    let email = payload
        .email
        .filter(|e| !e.trim().is_empty())
        .map(|e| Customer::normalize_email(&e))
        .ok_or_else(|| AppError::InvalidInput(ERR_EMAIL_REQUIRED.to_string()))?;

    if !Customer::validate_email(&email) {
        return Err(AppError::InvalidInput(ERR_INVALID_EMAIL.to_string()));
    }

    let total_users = match Customer::grant_beta_access(&state.db, &email).await? {
        BetaSignup::AlreadyExists => {
            return Ok(Json(AddBetaUserResponse {
                message: "User already exists and has beta access".to_string(),
                email,
                already_exists: Some(true),
                total_users: None,
            }));
        }
        BetaSignup::Added { total_users } => total_users,
    };

    tracing::info!("Beta user added: {} ({} total)", email, total_users);

    Ok(Json(AddBetaUserResponse {
        message: "Successfully added beta user".to_string(),
        email,
        already_exists: None,
        total_users: Some(total_users),
    }))
}
