//! Information persistence.
//!
//! Information entries are typed facts attached to a subject. Values are stored
//! as bytes: UTF-8 for text, raw file contents for binary, and a comma-separated
//! id list for composites.

use super::associations::{delete_entity, EntityKind};
use crate::error::{DossierError, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

/// The type of an information entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    Text,
    Binary,
    Composite,
}

impl InfoKind {
    /// Returns the kind as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Composite => "composite",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "binary" => Self::Binary,
            "composite" => Self::Composite,
            _ => Self::Text,
        }
    }
}

/// A fact attached to a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Information {
    pub id: i64,
    pub subject_id: i64,
    pub kind: InfoKind,
    pub name: String,
    pub value: Vec<u8>,
    pub note: String,
    pub created_at: String,
    pub modified_at: String,
}

impl Information {
    /// Returns the ids referenced by a composite entry.
    pub fn composite_ids(&self) -> Vec<i64> {
        if self.kind != InfoKind::Composite {
            return Vec::new();
        }
        String::from_utf8_lossy(&self.value)
            .split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect()
    }
}

#[derive(Debug, Clone, FromRow)]
struct InformationRow {
    id: i64,
    subject_id: i64,
    kind: String,
    name: String,
    value: Vec<u8>,
    note: String,
    created_at: String,
    modified_at: String,
}

impl From<InformationRow> for Information {
    fn from(row: InformationRow) -> Self {
        Self {
            id: row.id,
            subject_id: row.subject_id,
            kind: InfoKind::from_str(&row.kind),
            name: row.name,
            value: row.value,
            note: row.note,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

/// Creates an information entry and returns its id.
pub async fn create_information(
    pool: &SqlitePool,
    subject_id: i64,
    kind: InfoKind,
    name: &str,
    value: &[u8],
    note: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO information (subject_id, kind, name, value, note)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(subject_id)
    .bind(kind.as_str())
    .bind(name)
    .bind(value)
    .bind(note)
    .execute(pool)
    .await
    .map_err(|e| super::map_write_error(e, &format!("Information '{name}'")))?;

    Ok(result.last_insert_rowid())
}

/// Lists a subject's information in id order.
pub async fn list_information(pool: &SqlitePool, subject_id: i64) -> Result<Vec<Information>> {
    let rows: Vec<InformationRow> = sqlx::query_as(
        r#"
        SELECT id, subject_id, kind, name, value, note, created_at, modified_at
        FROM information
        WHERE subject_id = ?
        ORDER BY id
        "#,
    )
    .bind(subject_id)
    .fetch_all(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to list information: {e}")))?;

    Ok(rows.into_iter().map(Information::from).collect())
}

/// Gets an information entry by id.
pub async fn get_information(pool: &SqlitePool, id: i64) -> Result<Option<Information>> {
    let row: Option<InformationRow> = sqlx::query_as(
        r#"
        SELECT id, subject_id, kind, name, value, note, created_at, modified_at
        FROM information
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to get information: {e}")))?;

    Ok(row.map(Information::from))
}

/// Replaces an entry's value and bumps its modification time.
pub async fn update_information_value(pool: &SqlitePool, id: i64, value: &[u8]) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE information SET value = ?, modified_at = datetime('now') WHERE id = ?",
    )
    .bind(value)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to update information: {e}")))?;

    Ok(result.rows_affected() > 0)
}

/// Deletes an information entry and its association memberships.
pub async fn delete_information(pool: &SqlitePool, id: i64) -> Result<bool> {
    delete_entity(pool, EntityKind::Information, id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: InfoKind, value: &[u8]) -> Information {
        Information {
            id: 1,
            subject_id: 1,
            kind,
            name: "n".to_string(),
            value: value.to_vec(),
            note: String::new(),
            created_at: String::new(),
            modified_at: String::new(),
        }
    }

    #[test]
    fn test_composite_ids() {
        assert_eq!(
            entry(InfoKind::Composite, b"3, 4,x,9").composite_ids(),
            vec![3, 4, 9]
        );
    }

    #[test]
    fn test_non_composite_has_no_ids() {
        assert!(entry(InfoKind::Text, b"1,2").composite_ids().is_empty());
    }
}
