pub mod admin;
pub mod backup;
pub mod beta;
pub mod customers;
pub mod health;
pub mod users;
pub mod waitlist;

pub use admin::AdminAccess;
pub use backup::{backup_status, delete_backup, export_backup, import_backup};
pub use beta::add_beta_user;
pub use customers::{check_customer, list_customers, upsert_customer};
pub use health::health_check;
pub use users::export_users;
pub use waitlist::{join_waitlist, list_waitlist};

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::AppState;

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    let max_import_size = state.config.max_import_size_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/customers", post(upsert_customer).get(list_customers))
        .route("/api/customers/check", post(check_customer))
        .route("/api/waitlist", post(join_waitlist).get(list_waitlist))
        .route("/api/add-beta-user", post(add_beta_user))
        .route("/api/admin/users/export", get(export_users))
        .route("/api/admin/backup/export", post(export_backup))
        .route(
            "/api/admin/backup/import",
            post(import_backup).layer(DefaultBodyLimit::max(max_import_size)),
        )
        .route("/api/admin/backup/status", get(backup_status))
        .route("/api/admin/backup/delete", delete(delete_backup))
        .with_state(state)
}
