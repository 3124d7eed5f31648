// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management: PRAGMA setup, migrations, and shutdown.
//!
//! All access is serialized through tokio-rusqlite's background thread.

use std::path::Path;

use teamdesk_core::TeamdeskError;
use tracing::debug;

/// Convert a tokio-rusqlite call error into a storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TeamdeskError {
    TeamdeskError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the cache database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and run migrations.
    pub async fn open(path: impl AsRef<Path>, wal_mode: bool) -> Result<Self, TeamdeskError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TeamdeskError::Storage {
                    source: Box::new(e),
                })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| TeamdeskError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path = %path.display(), wal_mode, "cache database opened");
        Ok(db)
    }

    /// Open a private in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, TeamdeskError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| TeamdeskError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), TeamdeskError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.pragma_update(None, "journal_mode", "WAL")?;
                }
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.busy_timeout(std::time::Duration::from_secs(5))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| -> Result<Result<(), TeamdeskError>, rusqlite::Error> {
                Ok(crate::migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), TeamdeskError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_parent_directories_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        let db = Database::open(&path, true).await.unwrap();
        assert!(path.exists());

        let tables: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_cache'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(tables, 1);
        db.checkpoint().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_does_not_rerun_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        drop(Database::open(&path, true).await.unwrap());
        let db = Database::open(&path, true).await.unwrap();

        let applied: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| {
                    row.get(0)
                })
            })
            .await
            .unwrap();
        assert_eq!(applied, 1);
    }
}
