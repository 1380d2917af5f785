//! Persistence layer for dossier.
//!
//! Local SQLite storage for rings, subjects, information, locations, time
//! entries and associations. Each entity module exposes free async functions
//! that take the pool, so handlers can compose them freely.

pub mod associations;
pub mod information;
pub mod locations;
mod migrations;
pub mod rings;
pub mod subjects;
pub mod times;

pub use associations::{Association, AssociationMember, EntityKind};
pub use information::{InfoKind, Information};
pub use locations::Location;
pub use rings::Ring;
pub use subjects::Subject;
pub use times::TimeEntry;

use crate::error::{DossierError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

const MAX_RETRY_ATTEMPTS: u32 = 3;
const RETRY_DELAY_MS: u64 = 100;

/// Handle to the dossier database.
pub struct Store {
    pool: SqlitePool,
    db_path: Option<PathBuf>,
}

impl Store {
    /// Opens or creates the database at the specified path.
    pub async fn open(path: &Path) -> Result<Self> {
        Self::ensure_parent_dirs(path)?;

        let mut last_error = None;
        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS * 2u64.pow(attempt)))
                    .await;
            }

            match Self::connect(path).await {
                Ok(pool) => {
                    migrations::run_migrations(&pool).await?;
                    info!("Database opened at {}", path.display());
                    return Ok(Self {
                        pool,
                        db_path: Some(path.to_path_buf()),
                    });
                }
                Err(e) => {
                    warn!("Attempt {} to open database failed: {e}", attempt + 1);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DossierError::persistence("Failed to open database after retries")))
    }

    /// Opens a throwaway in-memory database.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DossierError::persistence(format!("Invalid database url: {e}")))?
            .foreign_keys(true);

        // One connection: every pooled connection would get its own memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DossierError::persistence(format!("Failed to open memory database: {e}")))?;

        migrations::run_migrations(&pool).await?;
        Ok(Self {
            pool,
            db_path: None,
        })
    }

    /// Creates a connection pool to the SQLite database.
    async fn connect(path: &Path) -> Result<SqlitePool> {
        let conn_str = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(|e| DossierError::persistence(format!("Invalid database path: {e}")))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .create_if_missing(true);

        SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| DossierError::persistence(format!("Failed to connect to database: {e}")))
    }

    fn ensure_parent_dirs(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DossierError::persistence(format!(
                    "Failed to create data directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Ok(())
    }

    /// Returns the database file path, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Maps a sqlx error to a persistence error, naming duplicates clearly.
pub(crate) fn map_write_error(e: sqlx::Error, what: &str) -> DossierError {
    if e.to_string().contains("UNIQUE constraint") {
        DossierError::persistence(format!("{what} already exists"))
    } else {
        DossierError::persistence(format!("Failed to write {what}: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_creates_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let store = Store::open(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), Some(path.as_path()));
        store.close().await;
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dirs").join("dossier.db");

        let store = Store::open(&path).await.unwrap();
        assert!(path.exists());
        store.close().await;
    }

    #[tokio::test]
    async fn test_in_memory_store_has_no_path() {
        let store = Store::open_in_memory().await.unwrap();
        assert!(store.path().is_none());
    }
}
