// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value snapshot operations.

use rusqlite::{OptionalExtension, params};
use teamdesk_core::TeamdeskError;

use crate::database::{Database, map_tr_err};

/// Read the raw value under `key`.
pub async fn get(db: &Database, key: &str) -> Result<Option<String>, TeamdeskError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT value FROM kv_cache WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the value under `key`.
pub async fn put(db: &Database, key: &str, value: String) -> Result<(), TeamdeskError> {
    let key = key.to_string();
    let now = chrono::Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO kv_cache (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete `key`. Returns whether a row was removed.
pub async fn delete(db: &Database, key: &str) -> Result<bool, TeamdeskError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let removed = conn.execute("DELETE FROM kv_cache WHERE key = ?1", params![key])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// All stored keys, sorted.
pub async fn keys(db: &Database) -> Result<Vec<String>, TeamdeskError> {
    db.connection()
        .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT key FROM kv_cache ORDER BY key")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_existing_value() {
        let db = Database::open_in_memory().await.unwrap();
        put(&db, "chat_a", "[1]".into()).await.unwrap();
        put(&db, "chat_a", "[2]".into()).await.unwrap();
        assert_eq!(get(&db, "chat_a").await.unwrap().as_deref(), Some("[2]"));
        assert_eq!(keys(&db).await.unwrap(), vec!["chat_a".to_string()]);
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let db = Database::open_in_memory().await.unwrap();
        put(&db, "chat_b", "[]".into()).await.unwrap();
        assert!(delete(&db, "chat_b").await.unwrap());
        assert!(!delete(&db, "chat_b").await.unwrap());
        assert!(get(&db, "chat_b").await.unwrap().is_none());
    }
}
