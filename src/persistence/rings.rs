//! Ring persistence.
//!
//! A ring is the top-level investigation context. Deleting a ring cascades to
//! everything stored inside it.

use crate::error::{DossierError, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

/// An investigation context.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Ring {
    pub id: i64,
    pub name: String,
    pub note: String,
    pub created_at: String,
}

/// Creates a new ring and returns its id.
pub async fn create_ring(pool: &SqlitePool, name: &str, note: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO rings (name, note) VALUES (?, ?)")
        .bind(name)
        .bind(note)
        .execute(pool)
        .await
        .map_err(|e| super::map_write_error(e, &format!("Ring '{name}'")))?;

    Ok(result.last_insert_rowid())
}

/// Lists all rings in id order.
pub async fn list_rings(pool: &SqlitePool) -> Result<Vec<Ring>> {
    sqlx::query_as("SELECT id, name, note, created_at FROM rings ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to list rings: {e}")))
}

/// Gets a ring by id.
pub async fn get_ring(pool: &SqlitePool, id: i64) -> Result<Option<Ring>> {
    sqlx::query_as("SELECT id, name, note, created_at FROM rings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to get ring: {e}")))
}

/// Replaces a ring's note. Returns false if the ring does not exist.
pub async fn set_ring_note(pool: &SqlitePool, id: i64, note: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE rings SET note = ? WHERE id = ?")
        .bind(note)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to update ring: {e}")))?;

    Ok(result.rows_affected() > 0)
}

/// Deletes a ring and everything in it. Returns false if the ring does not exist.
pub async fn delete_ring(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM rings WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to delete ring: {e}")))?;

    Ok(result.rows_affected() > 0)
}
