use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;

/// Lesson row in the `lessons` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[sqlx(default)]
    pub description: Option<String>,
    #[sqlx(default)]
    pub content: Option<String>,
    #[sqlx(default)]
    pub category: Option<String>,
    #[sqlx(default)]
    pub duration: Option<String>,
    #[sqlx(default)]
    pub difficulty: Option<String>,
    #[sqlx(default)]
    pub video_url: Option<String>,
    #[sqlx(default)]
    pub video_summary: Option<String>,
    #[sqlx(default)]
    pub start_message: Option<String>,
    #[sqlx(default)]
    pub icon: Option<String>,
    #[sqlx(default)]
    pub color: Option<String>,
    #[sqlx(default)]
    pub order_index: Option<i64>,
    #[sqlx(default)]
    pub active: bool,
    #[sqlx(default)]
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Lesson {
    /// Write this row by primary key, overwriting any existing row with the same id
    pub async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO lessons (id, title, description, content, category, duration, \
             difficulty, video_url, video_summary, start_message, icon, color, order_index, \
             active, completed, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
             title = excluded.title, description = excluded.description, \
             content = excluded.content, category = excluded.category, \
             duration = excluded.duration, difficulty = excluded.difficulty, \
             video_url = excluded.video_url, video_summary = excluded.video_summary, \
             start_message = excluded.start_message, icon = excluded.icon, \
             color = excluded.color, order_index = excluded.order_index, \
             active = excluded.active, completed = excluded.completed, \
             created_at = excluded.created_at, updated_at = excluded.updated_at",
        )
        .bind(&self.id)
        .bind(&self.title)
        .bind(&self.description)
        .bind(&self.content)
        .bind(&self.category)
        .bind(&self.duration)
        .bind(&self.difficulty)
        .bind(&self.video_url)
        .bind(&self.video_summary)
        .bind(&self.start_message)
        .bind(&self.icon)
        .bind(&self.color)
        .bind(self.order_index)
        .bind(self.active)
        .bind(self.completed)
        .bind(&self.created_at)
        .bind(&self.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}
