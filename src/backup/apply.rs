use super::{CandidateSnapshot, ImportStrategy, TableCounts};
use crate::db::{tables, Db};

/// Write a validated snapshot into the live database in one transaction
///
/// Under [`ImportStrategy::Replace`] the three tables are emptied first.
/// Rows are then upserted by id in the order users, calculators, lessons.
/// Any error drops the transaction, which rolls every change back.
pub async fn apply_snapshot(
    db: &Db,
    snapshot: &CandidateSnapshot,
    strategy: ImportStrategy,
) -> Result<TableCounts, sqlx::Error> {
    let mut tx = db.begin().await?;

    if strategy == ImportStrategy::Replace {
        for table in tables::BACKUP_TABLES {
            let sql = format!("DELETE FROM {table}");
            let deleted = sqlx::query(&sql).execute(&mut *tx).await?.rows_affected();
            tracing::debug!("Cleared {} rows from {}", deleted, table);
        }
    }

    let mut counts = TableCounts::default();

    for customer in &snapshot.customers {
        customer.upsert(&mut *tx).await?;
        counts.users += 1;
    }

    for calculator in &snapshot.calculators {
        calculator.upsert(&mut *tx).await?;
        counts.calculators += 1;
    }

    for lesson in &snapshot.lessons {
        lesson.upsert(&mut *tx).await?;
        counts.lessons += 1;
    }

    tx.commit().await?;

    Ok(counts)
}
