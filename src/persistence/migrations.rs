//! Schema versioning and migrations for the dossier database.
//!
//! Manages database schema evolution with forward-only migrations.

use crate::error::{DossierError, Result};
use sqlx::sqlite::SqlitePool;
use tracing::info;

const CURRENT_VERSION: i32 = 1;

/// Runs all pending migrations on the database.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    ensure_schema_versions_table(pool).await?;

    let current = get_current_version(pool).await?;

    if current > CURRENT_VERSION {
        return Err(DossierError::persistence(format!(
            "Database schema version ({}) is newer than supported version ({}). \
             Please upgrade dossier to the latest version.",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        info!(
            "Migrating database from version {} to {}",
            current, CURRENT_VERSION
        );
        for version in (current + 1)..=CURRENT_VERSION {
            run_migration(pool, version).await?;
            record_version(pool, version).await?;
            info!("Applied migration v{}", version);
        }
    }

    Ok(())
}

async fn ensure_schema_versions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_versions (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| {
        DossierError::persistence(format!("Failed to create schema_versions table: {e}"))
    })?;

    Ok(())
}

async fn get_current_version(pool: &SqlitePool) -> Result<i32> {
    let row: Option<(Option<i32>,)> = sqlx::query_as("SELECT MAX(version) FROM schema_versions")
        .fetch_optional(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to get schema version: {e}")))?;

    Ok(row.and_then(|(v,)| v).unwrap_or(0))
}

async fn record_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_versions (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await
        .map_err(|e| DossierError::persistence(format!("Failed to record migration: {e}")))?;
    Ok(())
}

async fn run_migration(pool: &SqlitePool, version: i32) -> Result<()> {
    match version {
        1 => migration_v1(pool).await,
        _ => Err(DossierError::persistence(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: rings and everything that lives inside them.
async fn migration_v1(pool: &SqlitePool) -> Result<()> {
    let statements: &[(&str, &str)] = &[
        (
            "rings",
            r#"
            CREATE TABLE IF NOT EXISTS rings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                note TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        ),
        (
            "subjects",
            r#"
            CREATE TABLE IF NOT EXISTS subjects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ring_id INTEGER NOT NULL,
                codename TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(ring_id, codename),
                FOREIGN KEY (ring_id) REFERENCES rings(id) ON DELETE CASCADE
            )
            "#,
        ),
        (
            "information",
            r#"
            CREATE TABLE IF NOT EXISTS information (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('text', 'binary', 'composite')),
                name TEXT NOT NULL,
                value BLOB NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                modified_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE
            )
            "#,
        ),
        (
            "locations",
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ring_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (ring_id) REFERENCES rings(id) ON DELETE CASCADE
            )
            "#,
        ),
        (
            "times",
            r#"
            CREATE TABLE IF NOT EXISTS times (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ring_id INTEGER NOT NULL,
                moment TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (ring_id) REFERENCES rings(id) ON DELETE CASCADE
            )
            "#,
        ),
        (
            "associations",
            r#"
            CREATE TABLE IF NOT EXISTS associations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ring_id INTEGER NOT NULL,
                level INTEGER NOT NULL DEFAULT 0,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (ring_id) REFERENCES rings(id) ON DELETE CASCADE
            )
            "#,
        ),
        (
            "association_members",
            r#"
            CREATE TABLE IF NOT EXISTS association_members (
                association_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('subject', 'information', 'location', 'time')),
                target_id INTEGER NOT NULL,
                PRIMARY KEY (association_id, kind, target_id),
                FOREIGN KEY (association_id) REFERENCES associations(id) ON DELETE CASCADE
            )
            "#,
        ),
        (
            "association_members index",
            r#"
            CREATE INDEX IF NOT EXISTS idx_association_members_target
            ON association_members(kind, target_id)
            "#,
        ),
    ];

    for (name, sql) in statements {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| DossierError::persistence(format!("Failed to create {name}: {e}")))?;
    }

    Ok(())
}
