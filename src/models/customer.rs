use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::FromRow;

use crate::db::{self, tables};

/// Customer (beta user) row in the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    /// Normalized (trimmed, lowercase) and unique across all customers
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(default)]
    pub phone: Option<String>,
    #[sqlx(default)]
    pub notes: Option<String>,
    #[sqlx(default)]
    pub marketing_consent: bool,
    #[sqlx(default)]
    pub sms_consent: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted when a customer signs up
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub marketing_consent: bool,
    pub sms_consent: bool,
}

/// Outcome of granting beta access to an email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetaSignup {
    /// A customer with this email already existed and was left untouched
    AlreadyExists,
    /// A "Beta User" customer was created
    Added { total_users: i64 },
}

impl Customer {
    /// Normalize an email address for storage and lookups
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Validate the shape `local@domain.tld` with no whitespace
    pub fn validate_email(email: &str) -> bool {
        if email.chars().any(char::is_whitespace) {
            return false;
        }

        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') {
            return false;
        }

        match domain.rsplit_once('.') {
            Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
            None => false,
        }
    }

    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>("SELECT * FROM users WHERE email = ? LIMIT 1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    /// Insert a new customer or update the existing one with the same email
    ///
    /// Returns the stored customer and whether it was newly created.
    pub async fn upsert_by_email(
        pool: &SqlitePool,
        new: NewCustomer,
    ) -> Result<(Customer, bool), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM users WHERE email = ? LIMIT 1")
                .bind(&new.email)
                .fetch_optional(&mut *tx)
                .await?;

        let is_new = existing.is_none();
        let id = match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE users SET first_name = ?, last_name = ?, phone = ?, notes = ?, \
                     marketing_consent = ?, sms_consent = ?, updated_at = datetime('now') \
                     WHERE id = ?",
                )
                .bind(&new.first_name)
                .bind(&new.last_name)
                .bind(&new.phone)
                .bind(&new.notes)
                .bind(new.marketing_consent)
                .bind(new.sms_consent)
                .bind(&id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO users (id, email, first_name, last_name, phone, notes, \
                     marketing_consent, sms_consent, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))",
                )
                .bind(&id)
                .bind(&new.email)
                .bind(&new.first_name)
                .bind(&new.last_name)
                .bind(&new.phone)
                .bind(&new.notes)
                .bind(new.marketing_consent)
                .bind(new.sms_consent)
                .execute(&mut *tx)
                .await?;
                id
            }
        };

        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM users WHERE id = ?")
            .bind(&id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((customer, is_new))
    }

    /// Create a "Beta User" customer for an email unless one exists
    ///
    /// The email must already be normalized.
    pub async fn grant_beta_access(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<BetaSignup, sqlx::Error> {
        if Self::find_by_email(pool, email).await?.is_some() {
            return Ok(BetaSignup::AlreadyExists);
        }

        Self::upsert_by_email(
            pool,
            NewCustomer {
                email: email.to_string(),
                first_name: "Beta".to_string(),
                last_name: "User".to_string(),
                phone: None,
                notes: None,
                marketing_consent: false,
                sms_consent: false,
            },
        )
        .await?;

        let total_users = db::count_rows(pool, tables::USERS).await?;
        Ok(BetaSignup::Added { total_users })
    }

    /// Write this row by primary key, overwriting any existing row with the same id
    ///
    /// A different customer holding the same email is removed first, so the
    /// written row owns the email afterwards.
    pub async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        let displaced = sqlx::query("DELETE FROM users WHERE email = ? AND id <> ?")
            .bind(&self.email)
            .bind(&self.id)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        if displaced > 0 {
            tracing::info!("Customer {} replaces existing holder of {}", self.id, self.email);
        }

        sqlx::query(
            "INSERT INTO users (id, email, first_name, last_name, phone, notes, \
             marketing_consent, sms_consent, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
             email = excluded.email, first_name = excluded.first_name, \
             last_name = excluded.last_name, phone = excluded.phone, notes = excluded.notes, \
             marketing_consent = excluded.marketing_consent, sms_consent = excluded.sms_consent, \
             created_at = excluded.created_at, updated_at = excluded.updated_at",
        )
        .bind(&self.id)
        .bind(&self.email)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.phone)
        .bind(&self.notes)
        .bind(self.marketing_consent)
        .bind(self.sms_consent)
        .bind(&self.created_at)
        .bind(&self.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            Customer::normalize_email("  Jane.Doe@Example.COM "),
            "jane.doe@example.com"
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(Customer::validate_email("jane@example.com"));
        assert!(Customer::validate_email("a.b+c@mail.example.org"));

        // Missing pieces
        assert!(!Customer::validate_email(""));
        assert!(!Customer::validate_email("jane"));
        assert!(!Customer::validate_email("@example.com"));
        assert!(!Customer::validate_email("jane@example"));
        assert!(!Customer::validate_email("jane@.com"));
        assert!(!Customer::validate_email("jane@example."));

        // Whitespace and double @
        assert!(!Customer::validate_email("ja ne@example.com"));
        assert!(!Customer::validate_email("jane@@example.com"));
    }
}
