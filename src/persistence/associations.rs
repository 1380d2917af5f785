//! Association persistence.
//!
//! An association links any mix of subjects, information, locations and time
//! entries of one ring. Members are stored polymorphically as `(kind, target_id)`
//! pairs, so entity deletion goes through [`delete_entity`] to drop dangling
//! memberships in the same transaction.

use crate::error::{DossierError, Result};
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::{FromRow, Transaction};

/// The kinds of entity an association can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Subject,
    Information,
    Location,
    Time,
}

impl EntityKind {
    /// Returns the kind as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Information => "information",
            Self::Location => "location",
            Self::Time => "time",
        }
    }

    /// Parses a stored kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "subject" => Some(Self::Subject),
            "information" => Some(Self::Information),
            "location" => Some(Self::Location),
            "time" => Some(Self::Time),
            _ => None,
        }
    }

    fn table(&self) -> &'static str {
        match self {
            Self::Subject => "subjects",
            Self::Information => "information",
            Self::Location => "locations",
            Self::Time => "times",
        }
    }
}

/// A typed link between entities of a ring.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Association {
    pub id: i64,
    pub ring_id: i64,
    pub level: i64,
    pub description: String,
    pub created_at: String,
}

/// One endpoint of an association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationMember {
    pub association_id: i64,
    pub kind: EntityKind,
    pub target_id: i64,
}

/// Creates an association and returns its id.
pub async fn create_association(
    pool: &SqlitePool,
    ring_id: i64,
    level: i64,
    description: &str,
) -> Result<i64> {
    let result =
        sqlx::query("INSERT INTO associations (ring_id, level, description) VALUES (?, ?, ?)")
            .bind(ring_id)
            .bind(level)
            .bind(description)
            .execute(pool)
            .await
            .map_err(|e| super::map_write_error(e, "association"))?;

    Ok(result.last_insert_rowid())
}

/// Lists the associations of a ring, highest level first, then by id.
pub async fn list_associations(pool: &SqlitePool, ring_id: i64) -> Result<Vec<Association>> {
    sqlx::query_as(
        r#"
        SELECT id, ring_id, level, description, created_at
        FROM associations
        WHERE ring_id = ?
        ORDER BY level DESC, id
        "#,
    )
    .bind(ring_id)
    .fetch_all(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to list associations: {e}")))
}

/// Gets an association by id.
pub async fn get_association(pool: &SqlitePool, id: i64) -> Result<Option<Association>> {
    sqlx::query_as(
        "SELECT id, ring_id, level, description, created_at FROM associations WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to get association: {e}")))
}

/// Lists the members of an association grouped by kind.
pub async fn list_members(pool: &SqlitePool, association_id: i64) -> Result<Vec<AssociationMember>> {
    let rows: Vec<(i64, String, i64)> = sqlx::query_as(
        r#"
        SELECT association_id, kind, target_id
        FROM association_members
        WHERE association_id = ?
        "#,
    )
    .bind(association_id)
    .fetch_all(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to list members: {e}")))?;

    let mut members: Vec<AssociationMember> = rows
        .into_iter()
        .filter_map(|(association_id, kind, target_id)| {
            EntityKind::parse(&kind).map(|kind| AssociationMember {
                association_id,
                kind,
                target_id,
            })
        })
        .collect();
    members.sort_by_key(|m| (m.kind, m.target_id));
    Ok(members)
}

/// Links an entity to an association. Linking twice is a no-op.
pub async fn add_member(
    pool: &SqlitePool,
    association_id: i64,
    kind: EntityKind,
    target_id: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO association_members (association_id, kind, target_id) VALUES (?, ?, ?)",
    )
    .bind(association_id)
    .bind(kind.as_str())
    .bind(target_id)
    .execute(pool)
    .await
    .map_err(|e| DossierError::persistence(format!("Failed to link {}: {e}", kind.as_str())))?;

    Ok(())
}

/// Returns true if the entity exists and belongs to the ring.
pub async fn entity_in_ring(
    pool: &SqlitePool,
    kind: EntityKind,
    id: i64,
    ring_id: i64,
) -> Result<bool> {
    let sql = match kind {
        EntityKind::Information => {
            r#"
            SELECT 1 FROM information i
            JOIN subjects s ON s.id = i.subject_id
            WHERE i.id = ? AND s.ring_id = ?
            "#
        }
        EntityKind::Subject => "SELECT 1 FROM subjects WHERE id = ? AND ring_id = ?",
        EntityKind::Location => "SELECT 1 FROM locations WHERE id = ? AND ring_id = ?",
        EntityKind::Time => "SELECT 1 FROM times WHERE id = ? AND ring_id = ?",
    };

    let row: Option<(i64,)> = sqlx::query_as(sql)
        .bind(id)
        .bind(ring_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to look up {}: {e}", kind.as_str())))?;

    Ok(row.is_some())
}

/// Returns a short human label for an association member.
pub async fn member_label(pool: &SqlitePool, kind: EntityKind, id: i64) -> Result<Option<String>> {
    let sql = match kind {
        EntityKind::Subject => "SELECT codename FROM subjects WHERE id = ?",
        EntityKind::Information => {
            r#"
            SELECT s.codename || ': ' || i.name FROM information i
            JOIN subjects s ON s.id = i.subject_id
            WHERE i.id = ?
            "#
        }
        EntityKind::Location => "SELECT name FROM locations WHERE id = ?",
        EntityKind::Time => "SELECT moment FROM times WHERE id = ?",
    };

    let row: Option<(String,)> = sqlx::query_as(sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to label {}: {e}", kind.as_str())))?;

    Ok(row.map(|(label,)| label))
}

/// Deletes an association and its memberships.
pub async fn delete_association(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM associations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to delete association: {e}")))?;

    Ok(result.rows_affected() > 0)
}

/// Deletes an entity together with every membership pointing at it.
///
/// A subject also takes its information entries (and their memberships) with it.
/// Returns false if the entity does not exist.
pub async fn delete_entity(pool: &SqlitePool, kind: EntityKind, id: i64) -> Result<bool> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to begin transaction: {e}")))?;

    if kind == EntityKind::Subject {
        let info_ids: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM information WHERE subject_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| DossierError::persistence(format!("Failed to list information: {e}")))?;

        for (info_id,) in info_ids {
            unlink(&mut tx, EntityKind::Information, info_id).await?;
        }
    }
    unlink(&mut tx, kind, id).await?;

    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to delete {}: {e}", kind.as_str())))?;

    tx.commit()
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to commit: {e}")))?;

    Ok(result.rows_affected() > 0)
}

async fn unlink(tx: &mut Transaction<'_, Sqlite>, kind: EntityKind, target_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM association_members WHERE kind = ? AND target_id = ?")
        .bind(kind.as_str())
        .bind(target_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to unlink {}: {e}", kind.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_round_trip() {
        for kind in [
            EntityKind::Subject,
            EntityKind::Information,
            EntityKind::Location,
            EntityKind::Time,
        ] {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::parse("ring"), None);
    }
}
