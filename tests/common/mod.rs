//! Shared helpers for integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use zerofinanx_server::models::{Calculator, Customer, Lesson};
use zerofinanx_server::{open_database, BackupService, BackupSettings, Config, Db};

pub const TEST_ADMIN_KEY: &str = "test-admin-key";

/// Create a test configuration rooted in a temporary directory
pub fn test_config(root: &Path) -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_path: root.join("live.db"),
        backup_dir: root.join("backups"),
        temp_dir: root.join("temp"),
        backup_file_prefix: "zerofinanx".to_string(),
        max_import_size_bytes: 10 * 1024 * 1024,
        allowed_origins: vec!["http://localhost:3003".to_string()],
        environment: "test".to_string(),
        admin_secret_key: Some(TEST_ADMIN_KEY.to_string()),
        sendgrid_api_key: None,
        email_from: "test@zerofinanx.com".to_string(),
    }
}

/// Open (and migrate) a database file inside the given directory
pub async fn open_test_db(root: &Path, name: &str) -> Db {
    open_database(root.join(name))
        .await
        .expect("Failed to open test database")
}

pub fn test_service(db: Db, root: &Path) -> BackupService {
    BackupService::new(
        db,
        BackupSettings {
            backup_dir: root.join("backups"),
            file_prefix: "zerofinanx".to_string(),
        },
    )
}

pub fn customer(id: &str, email: &str, first_name: &str) -> Customer {
    Customer {
        id: id.to_string(),
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        phone: None,
        notes: None,
        marketing_consent: false,
        sms_consent: false,
        created_at: "2024-06-01 10:00:00".to_string(),
        updated_at: "2024-06-01 10:00:00".to_string(),
    }
}

pub fn calculator(id: &str, name: &str) -> Calculator {
    Calculator {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} calculator")),
        category: Some("planning".to_string()),
        calculator_type: Some("artifact".to_string()),
        code: None,
        content: None,
        url: None,
        icon: Some("calculator".to_string()),
        color: Some("#4f46e5".to_string()),
        fields: Some("[]".to_string()),
        is_active: true,
        is_published: true,
        order_index: Some(1),
        file_name: None,
        artifact_url: None,
        created_at: "2024-06-01 10:00:00".to_string(),
        updated_at: "2024-06-01 10:00:00".to_string(),
    }
}

pub fn lesson(id: &str, title: &str) -> Lesson {
    Lesson {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        content: Some("Lesson body".to_string()),
        category: Some("basics".to_string()),
        duration: Some("5 min".to_string()),
        difficulty: Some("beginner".to_string()),
        video_url: None,
        video_summary: None,
        start_message: None,
        icon: None,
        color: None,
        order_index: Some(1),
        active: true,
        completed: false,
        created_at: "2024-06-01 10:00:00".to_string(),
        updated_at: "2024-06-01 10:00:00".to_string(),
    }
}

/// Insert rows through the same upserts the importer uses
pub async fn seed(db: &Db, customers: &[Customer], calculators: &[Calculator], lessons: &[Lesson]) {
    let mut conn = db.acquire().await.unwrap();
    for row in customers {
        row.upsert(&mut conn).await.unwrap();
    }
    for row in calculators {
        row.upsert(&mut conn).await.unwrap();
    }
    for row in lessons {
        row.upsert(&mut conn).await.unwrap();
    }
}

/// Write a complete candidate backup file and close it
pub async fn create_candidate(
    root: &Path,
    name: &str,
    customers: &[Customer],
    calculators: &[Calculator],
    lessons: &[Lesson],
) -> PathBuf {
    let db = open_test_db(root, name).await;
    seed(&db, customers, calculators, lessons).await;
    db.close().await;
    root.join(name)
}

/// A valid SQLite file that only has the `users` and `calculators` tables
pub async fn create_candidate_without_lessons(root: &Path, name: &str) -> PathBuf {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    let path = root.join(name);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(&path)
                .create_if_missing(true),
        )
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE users (id TEXT PRIMARY KEY, email TEXT NOT NULL UNIQUE, \
         first_name TEXT NOT NULL, last_name TEXT NOT NULL, \
         created_at TEXT NOT NULL, updated_at TEXT NOT NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("CREATE TABLE calculators (id TEXT PRIMARY KEY, name TEXT NOT NULL)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO users (id, email, first_name, last_name, created_at, updated_at) \
         VALUES ('x1', 'x1@example.com', 'X', 'One', '2024-06-01 10:00:00', '2024-06-01 10:00:00')",
    )
    .execute(&pool)
    .await
    .unwrap();

    pool.close().await;
    path
}

/// Make the live database abort any lesson insert with the given title
pub async fn reject_lesson_title(db: &Db, title: &str) {
    let sql = format!(
        "CREATE TRIGGER reject_lesson BEFORE INSERT ON lessons \
         WHEN NEW.title = '{title}' \
         BEGIN SELECT RAISE(ABORT, 'lesson rejected'); END"
    );
    sqlx::query(&sql).execute(db).await.unwrap();
}

pub async fn all_customers(db: &Db) -> Vec<Customer> {
    sqlx::query_as::<_, Customer>("SELECT * FROM users ORDER BY id")
        .fetch_all(db)
        .await
        .unwrap()
}

pub async fn all_calculators(db: &Db) -> Vec<Calculator> {
    sqlx::query_as::<_, Calculator>("SELECT * FROM calculators ORDER BY id")
        .fetch_all(db)
        .await
        .unwrap()
}

pub async fn all_lessons(db: &Db) -> Vec<Lesson> {
    sqlx::query_as::<_, Lesson>("SELECT * FROM lessons ORDER BY id")
        .fetch_all(db)
        .await
        .unwrap()
}

pub fn sorted<T: Clone, K: Ord>(rows: &[T], key: impl Fn(&T) -> K) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|r| key(r));
    rows
}
