//! CSV export of customer signups for the admin dashboard

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

/// Byte order mark that makes Excel read the CSV as UTF-8
const UTF8_BOM: &str = "\u{FEFF}";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SignupRow {
    pub email: String,
    pub created_at: String,
}

/// All customers, newest signup first
pub async fn fetch_signups(pool: &SqlitePool) -> Result<Vec<SignupRow>, sqlx::Error> {
    sqlx::query_as::<_, SignupRow>("SELECT email, created_at FROM users ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

/// Render signups as `Email,Signup Date` CSV with every value quoted
pub fn generate_csv(rows: &[SignupRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push("Email,Signup Date".to_string());

    for row in rows {
        lines.push(format!(
            "{},{}",
            quote(&row.email),
            quote(&format_signup_date(&row.created_at))
        ));
    }

    lines.join("\n")
}

/// Same as [`generate_csv`], prefixed with a UTF-8 BOM for Excel
pub fn generate_excel_csv(rows: &[SignupRow]) -> Vec<u8> {
    let mut out = String::from(UTF8_BOM);
    out.push_str(&generate_csv(rows));
    out.into_bytes()
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// `2024-06-01 14:05:09` becomes `06/01/2024, 02:05:09 PM`
///
/// Accepts SQLite `datetime('now')` output and RFC 3339. Anything else is
/// returned unchanged.
pub fn format_signup_date(raw: &str) -> String {
    const DISPLAY: &str = "%m/%d/%Y, %I:%M:%S %p";

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_utc().format(DISPLAY).to_string();
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(email: &str, created_at: &str) -> SignupRow {
        SignupRow {
            email: email.to_string(),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_format_signup_date() {
        assert_eq!(
            format_signup_date("2024-06-01 14:05:09"),
            "06/01/2024, 02:05:09 PM"
        );
        assert_eq!(
            format_signup_date("2024-06-01T09:00:00Z"),
            "06/01/2024, 09:00:00 AM"
        );
        assert_eq!(format_signup_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_generate_csv() {
        let csv = generate_csv(&[
            row("jane@example.com", "2024-06-01 14:05:09"),
            row("odd\"name@example.com", "not a date"),
        ]);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Email,Signup Date");
        assert_eq!(lines[1], "\"jane@example.com\",\"06/01/2024, 02:05:09 PM\"");
        assert_eq!(lines[2], "\"odd\"\"name@example.com\",\"not a date\"");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_excel_csv_has_bom() {
        let bytes = generate_excel_csv(&[row("jane@example.com", "2024-06-01 14:05:09")]);
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert!(String::from_utf8(bytes).unwrap().contains("jane@example.com"));
    }
}
