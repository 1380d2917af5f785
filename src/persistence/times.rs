//! Time entry persistence.

use super::associations::{delete_entity, EntityKind};
use crate::error::{DossierError, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

/// A point in time recorded within a ring.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TimeEntry {
    pub id: i64,
    pub ring_id: i64,
    pub moment: String,
    pub note: String,
    pub created_at: String,
}

/// Creates a time entry and returns its id. `moment` is expected to be validated.
pub async fn create_time(pool: &SqlitePool, ring_id: i64, moment: &str, note: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO times (ring_id, moment, note) VALUES (?, ?, ?)")
        .bind(ring_id)
        .bind(moment)
        .bind(note)
        .execute(pool)
        .await
        .map_err(|e| super::map_write_error(e, "time entry"))?;

    Ok(result.last_insert_rowid())
}

/// Lists the time entries of a ring in chronological order.
pub async fn list_times(pool: &SqlitePool, ring_id: i64) -> Result<Vec<TimeEntry>> {
    sqlx::query_as(
        r#"
        SELECT id, ring_id, moment, note, created_at
        FROM times
        WHERE ring_id = ?
        ORDER BY moment, id
        "#,
    )
    .bind(ring_id)
    .fetch_all(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to list time entries: {e}")))
}

/// Deletes a time entry and its association memberships.
pub async fn delete_time(pool: &SqlitePool, id: i64) -> Result<bool> {
    delete_entity(pool, EntityKind::Time, id).await
}
