use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::constants::{ERR_CUSTOMER_FIELDS_REQUIRED, ERR_EMAIL_REQUIRED, ERR_INVALID_EMAIL};
use crate::email::OutgoingEmail;
use crate::error::{AppError, Result};
use crate::models::{Customer, NewCustomer};
use crate::routes::AdminAccess;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub marketing_consent: Option<bool>,
    pub sms_consent: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub customer: Customer,
    pub is_new_customer: bool,
}

#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub customers: Vec<Customer>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CheckCustomerRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckCustomerResponse {
    pub exists: bool,
    pub email: String,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create a customer, or update the one with the same email
///
/// Returns 201 for a new customer and 200 for an update. New customers
/// get a welcome email, sent in the background.
pub async fn upsert_customer(
    State(state): State<AppState>,
    Json(payload): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>)> {
    let (Some(first_name), Some(last_name), Some(email)) = (
        required(payload.first_name),
        required(payload.last_name),
        required(payload.email),
    ) else {
        return Err(AppError::InvalidInput(
            ERR_CUSTOMER_FIELDS_REQUIRED.to_string(),
        ));
    };

    let email = Customer::normalize_email(&email);
    if !Customer::validate_email(&email) {
        return Err(AppError::InvalidInput(ERR_INVALID_EMAIL.to_string()));
    }

    let (customer, is_new_customer) = Customer::upsert_by_email(
        &state.db,
        NewCustomer {
            email,
            first_name,
            last_name,
            phone: required(payload.phone),
            notes: required(payload.notes),
            marketing_consent: payload.marketing_consent.unwrap_or(false),
            sms_consent: payload.sms_consent.unwrap_or(false),
        },
    )
    .await?;

    if is_new_customer {
        tracing::info!("New customer signed up: {}", customer.email);
        state
            .mailer
            .send_in_background(OutgoingEmail::welcome(&customer.email));
    } else {
        tracing::info!("Customer updated: {}", customer.email);
    }

    let status = if is_new_customer {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(CustomerResponse {
            customer,
            is_new_customer,
        }),
    ))
}

/// List all customers (admin)
pub async fn list_customers(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Result<Json<CustomerListResponse>> {
    let customers = Customer::list_all(&state.db).await?;
    let count = customers.len();

    Ok(Json(CustomerListResponse { customers, count }))
}

/// Check whether a customer exists for an email
pub async fn check_customer(
    State(state): State<AppState>,
    Json(payload): Json<CheckCustomerRequest>,
) -> Result<Json<CheckCustomerResponse>> {
    let email = required(payload.email)
        .map(|e| Customer::normalize_email(&e))
        .ok_or_else(|| AppError::InvalidInput(ERR_EMAIL_REQUIRED.to_string()))?;

    let exists = Customer::find_by_email(&state.db, &email).await?.is_some();

    Ok(Json(CheckCustomerResponse { exists, email }))
}
