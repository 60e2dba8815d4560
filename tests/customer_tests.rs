//! Tests for customer persistence against a real SQLite file

mod common;

use tempfile::TempDir;

use common::*;
use zerofinanx_server::models::{BetaSignup, Customer};

#[tokio::test]
async fn test_grant_beta_access_adds_once() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_test_db(temp_dir.path(), "live.db").await;
    seed(&db, &[customer("u1", "u1@example.com", "Ann")], &[], &[]).await;

    let first = Customer::grant_beta_access(&db, "beta@example.com")
        .await
        .unwrap();
    assert_eq!(first, BetaSignup::Added { total_users: 2 });

    let again = Customer::grant_beta_access(&db, "beta@example.com")
        .await
        .unwrap();
    assert_eq!(again, BetaSignup::AlreadyExists);

    let stored = Customer::find_by_email(&db, "beta@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.first_name, "Beta");
    assert_eq!(stored.last_name, "User");
    assert_eq!(all_customers(&db).await.len(), 2);
}

#[tokio::test]
async fn test_upsert_by_id_takes_over_email() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_test_db(temp_dir.path(), "live.db").await;
    seed(&db, &[customer("u1", "shared@example.com", "Old")], &[], &[]).await;

    let mut conn = db.acquire().await.unwrap();
    customer("u9", "shared@example.com", "New")
        .upsert(&mut conn)
        .await
        .unwrap();
    drop(conn);

    let users = all_customers(&db).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "u9");
    assert_eq!(users[0].first_name, "New");
}
