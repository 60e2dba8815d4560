use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::constants::ADMIN_KEY_HEADER;
use crate::security::verify_admin_key;
use crate::{AppError, AppState};

/// Query parameters accepted by admin endpoints
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    /// Admin secret key, when not sent as a header
    pub key: Option<String>,
}

/// Extractor guarding admin endpoints
///
/// The key is read from the `x-admin-key` header, falling back to the
/// `key` query parameter. Admin endpoints are disabled when no admin key
/// is configured.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

#[async_trait]
impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin_key = state
            .config
            .admin_secret_key
            .as_deref()
            .ok_or(AppError::Unauthorized)?;

        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| {
                Query::<AdminQuery>::try_from_uri(&parts.uri)
                    .ok()
                    .and_then(|Query(q)| q.key)
            });

        match provided {
            Some(key) if verify_admin_key(&key, admin_key) => Ok(AdminAccess),
            _ => {
                tracing::warn!("Invalid admin key attempt on {}", parts.uri.path());
                Err(AppError::Unauthorized)
            }
        }
    }
}
