use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;

/// Calculator definition row in the `calculators` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Calculator {
    pub id: String,
    pub name: String,
    #[sqlx(default)]
    pub description: Option<String>,
    #[sqlx(default)]
    pub category: Option<String>,
    #[sqlx(default)]
    pub calculator_type: Option<String>,
    #[sqlx(default)]
    pub code: Option<String>,
    #[sqlx(default)]
    pub content: Option<String>,
    #[sqlx(default)]
    pub url: Option<String>,
    #[sqlx(default)]
    pub icon: Option<String>,
    #[sqlx(default)]
    pub color: Option<String>,
    /// JSON-encoded field definitions
    #[sqlx(default)]
    pub fields: Option<String>,
    #[sqlx(default)]
    pub is_active: bool,
    #[sqlx(default)]
    pub is_published: bool,
    #[sqlx(default)]
    pub order_index: Option<i64>,
    #[sqlx(default)]
    pub file_name: Option<String>,
    #[sqlx(default)]
    pub artifact_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Calculator {
    /// Write this row by primary key, overwriting any existing row with the same id
    pub async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO calculators (id, name, description, category, calculator_type, code, \
             content, url, icon, color, fields, is_active, is_published, order_index, \
             file_name, artifact_url, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
             name = excluded.name, description = excluded.description, \
             category = excluded.category, calculator_type = excluded.calculator_type, \
             code = excluded.code, content = excluded.content, url = excluded.url, \
             icon = excluded.icon, color = excluded.color, fields = excluded.fields, \
             is_active = excluded.is_active, is_published = excluded.is_published, \
             order_index = excluded.order_index, file_name = excluded.file_name, \
             artifact_url = excluded.artifact_url, created_at = excluded.created_at, \
             updated_at = excluded.updated_at",
        )
        .bind(&self.id)
        .bind(&self.name)
        .bind(&self.description)
        .bind(&self.category)
        .bind(&self.calculator_type)
        .bind(&self.code)
        .bind(&self.content)
        .bind(&self.url)
        .bind(&self.icon)
        .bind(&self.color)
        .bind(&self.fields)
        .bind(self.is_active)
        .bind(self.is_published)
        .bind(self.order_index)
        .bind(&self.file_name)
        .bind(&self.artifact_url)
        .bind(&self.created_at)
        .bind(&self.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}
