// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`MessageCache`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use teamdesk_config::model::StorageConfig;
use teamdesk_core::{
    AdapterType, ChatMessage, HealthStatus, MessageCache, PluginAdapter, TeamdeskError,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed conversation cache.
///
/// The database is opened lazily by [`SqliteMessageCache::initialize`].
pub struct SqliteMessageCache {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteMessageCache {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database.
    pub fn with_database(db: Database) -> Self {
        Self {
            config: StorageConfig {
                database_path: String::new(),
                wal_mode: false,
            },
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Open the database at the configured path. Safe to call more than once.
    pub async fn initialize(&self) -> Result<(), TeamdeskError> {
        self.db
            .get_or_try_init(|| Database::open(&self.config.database_path, self.config.wal_mode))
            .await?;
        Ok(())
    }

    fn db(&self) -> Result<&Database, TeamdeskError> {
        self.db.get().ok_or_else(|| TeamdeskError::Storage {
            source: "cache not initialized -- call initialize() first".into(),
        })
    }

    /// Keys of every stored snapshot.
    pub async fn keys(&self) -> Result<Vec<String>, TeamdeskError> {
        queries::kv::keys(self.db()?).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteMessageCache {
    fn name(&self) -> &str {
        "sqlite-cache"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cache
    }

    async fn health_check(&self) -> Result<HealthStatus, TeamdeskError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("cache not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TeamdeskError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MessageCache for SqliteMessageCache {
    async fn load(&self, key: &str) -> Result<Option<Vec<ChatMessage>>, TeamdeskError> {
        let Some(raw) = queries::kv::get(self.db()?, key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
            Ok(messages) => Ok(Some(messages)),
            Err(e) => {
                // An unreadable snapshot is treated as absent.
                warn!(key, error = %e, "discarding unreadable cache snapshot");
                Ok(None)
            }
        }
    }

    async fn store(&self, key: &str, messages: &[ChatMessage]) -> Result<(), TeamdeskError> {
        let raw = serde_json::to_string(messages).map_err(|e| TeamdeskError::Storage {
            source: Box::new(e),
        })?;
        queries::kv::put(self.db()?, key, raw).await?;
        debug!(key, count = messages.len(), "cache snapshot stored");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), TeamdeskError> {
        let removed = queries::kv::delete(self.db()?, key).await?;
        debug!(key, removed, "cache snapshot removed");
        Ok(())
    }
}
