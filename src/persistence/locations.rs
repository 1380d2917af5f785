//! Location persistence.

use super::associations::{delete_entity, EntityKind};
use crate::error::{DossierError, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

/// A named place within a ring.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Location {
    pub id: i64,
    pub ring_id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub note: String,
    pub created_at: String,
}

/// Creates a location and returns its id.
pub async fn create_location(
    pool: &SqlitePool,
    ring_id: i64,
    name: &str,
    latitude: f64,
    longitude: f64,
    note: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO locations (ring_id, name, latitude, longitude, note)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(ring_id)
    .bind(name)
    .bind(latitude)
    .bind(longitude)
    .bind(note)
    .execute(pool)
    .await
    .map_err(|e| super::map_write_error(e, &format!("Location '{name}'")))?;

    Ok(result.last_insert_rowid())
}

/// Lists the locations of a ring in id order.
pub async fn list_locations(pool: &SqlitePool, ring_id: i64) -> Result<Vec<Location>> {
    sqlx::query_as(
        r#"
        SELECT id, ring_id, name, latitude, longitude, note, created_at
        FROM locations
        WHERE ring_id = ?
        ORDER BY id
        "#,
    )
    .bind(ring_id)
    .fetch_all(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to list locations: {e}")))
}

/// Deletes a location and its association memberships.
pub async fn delete_location(pool: &SqlitePool, id: i64) -> Result<bool> {
    delete_entity(pool, EntityKind::Location, id).await
}
