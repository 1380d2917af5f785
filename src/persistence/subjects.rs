//! Subject persistence.

use super::associations::{delete_entity, EntityKind};
use crate::error::{DossierError, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

/// A person of interest within a ring.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Subject {
    pub id: i64,
    pub ring_id: i64,
    pub codename: String,
    pub note: String,
    pub created_at: String,
}

/// Creates a subject in a ring and returns its id.
pub async fn create_subject(
    pool: &SqlitePool,
    ring_id: i64,
    codename: &str,
    note: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO subjects (ring_id, codename, note) VALUES (?, ?, ?)")
        .bind(ring_id)
        .bind(codename)
        .bind(note)
        .execute(pool)
        .await
        .map_err(|e| super::map_write_error(e, &format!("Subject '{codename}'")))?;

    Ok(result.last_insert_rowid())
}

/// Lists the subjects of a ring in id order.
pub async fn list_subjects(pool: &SqlitePool, ring_id: i64) -> Result<Vec<Subject>> {
    sqlx::query_as(
        r#"
        SELECT id, ring_id, codename, note, created_at
        FROM subjects
        WHERE ring_id = ?
        ORDER BY id
        "#,
    )
    .bind(ring_id)
    .fetch_all(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to list subjects: {e}")))
}

/// Gets a subject by id.
pub async fn get_subject(pool: &SqlitePool, id: i64) -> Result<Option<Subject>> {
    sqlx::query_as("SELECT id, ring_id, codename, note, created_at FROM subjects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to get subject: {e}")))
}

/// Deletes a subject, its information, and the memberships of both.
pub async fn delete_subject(pool: &SqlitePool, id: i64) -> Result<bool> {
    delete_entity(pool, EntityKind::Subject, id).await
}
