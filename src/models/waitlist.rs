use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

/// Waitlist signup
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WaitlistEntry {
    pub email: String,
    pub created_at: String,
}

impl WaitlistEntry {
    /// Add an email to the waitlist
    ///
    /// Returns `false` when the email was already present.
    pub async fn join(pool: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO waitlist (email) VALUES (?) ON CONFLICT(email) DO NOTHING")
                .bind(email)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All entries, newest first
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<WaitlistEntry>, sqlx::Error> {
        sqlx::query_as::<_, WaitlistEntry>(
            "SELECT email, created_at FROM waitlist ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
    }
}
