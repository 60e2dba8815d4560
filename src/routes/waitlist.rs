use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::constants::{ERR_EMAIL_REQUIRED, ERR_INVALID_EMAIL};
use crate::email::OutgoingEmail;
use crate::error::{AppError, Result};
use crate::models::{Customer, WaitlistEntry};
use crate::routes::AdminAccess;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct JoinWaitlistRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinWaitlistResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct WaitlistResponse {
    pub waitlist: Vec<WaitlistEntry>,
    pub count: usize,
}

/// Join the waitlist
///
/// Returns 201 for a new entry (and sends a confirmation email in the
/// background), 200 when the email is already on the list.
pub async fn join_waitlist(
    State(state): State<AppState>,
    Json(payload): Json<JoinWaitlistRequest>,
) -> Result<(StatusCode, Json<JoinWaitlistResponse>)> {
    let email = payload
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(ERR_EMAIL_REQUIRED.to_string()))?;

    let email = Customer::normalize_email(&email);
    if !Customer::validate_email(&email) {
        return Err(AppError::InvalidInput(ERR_INVALID_EMAIL.to_string()));
    }

    if !WaitlistEntry::join(&state.db, &email).await? {
        return Ok((
            StatusCode::OK,
            Json(JoinWaitlistResponse {
                message: "Email already on waitlist".to_string(),
                email,
            }),
        ));
    }

    tracing::info!("Waitlist signup: {}", email);
    state
        .mailer
        .send_in_background(OutgoingEmail::waitlist_confirmation(&email));

    Ok((
        StatusCode::CREATED,
        Json(JoinWaitlistResponse {
            message: "Successfully joined waitlist".to_string(),
            email,
        }),
    ))
}

/// List waitlist entries, newest first (admin)
pub async fn list_waitlist(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Result<Json<WaitlistResponse>> {
    let waitlist = WaitlistEntry::list_all(&state.db).await?;
    let count = waitlist.len();

    Ok(Json(WaitlistResponse { waitlist, count }))
}
