//! SQLite profile store: one row per participant, profile kept as JSON text.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use crate::profile::Profile;

use super::{ProfileStore, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS profiles (\
     participant_id TEXT PRIMARY KEY NOT NULL, \
     document TEXT NOT NULL, \
     updated_at TEXT NOT NULL DEFAULT (datetime('now')))";

/// Profiles kept in a SQLite table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened or the schema
    /// cannot be created.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        Self::from_pool(db).await
    }

    /// Use an existing pool, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the schema cannot be created.
    pub async fn from_pool(db: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(SCHEMA).execute(&db).await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn load(&self, participant: &str) -> Result<Option<Profile>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT document FROM profiles WHERE participant_id = ?1")
                .bind(participant)
                .fetch_optional(&self.db)
                .await?;
        match row {
            Some((document,)) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, participant: &str, profile: &Profile) -> Result<(), StoreError> {
        let document = serde_json::to_string(profile)?;
        sqlx::query(
            "INSERT INTO profiles (participant_id, document, updated_at) \
             VALUES (?1, ?2, datetime('now')) \
             ON CONFLICT(participant_id) DO UPDATE SET \
                 document = excluded.document, updated_at = excluded.updated_at",
        )
        .bind(participant)
        .bind(&document)
        .execute(&self.db)
        .await?;

        debug!(participant, bytes = document.len(), "profile row written");
        Ok(())
    }

    async fn participants(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT participant_id FROM profiles ORDER BY participant_id")
                .fetch_all(&self.db)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
