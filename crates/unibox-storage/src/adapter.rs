// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`ReadStateStore`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use unibox_config::model::StorageConfig;
use unibox_core::{Baseline, Channel, ReadStateKey, ReadStateStore, UniboxError};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed read-state store.
///
/// The database is opened lazily by [`SqliteReadStateStore::initialize`];
/// every other call fails with a storage error until then.
pub struct SqliteReadStateStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteReadStateStore {
    /// Create a store for the configured path without opening it.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, UniboxError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Open the database and run migrations. Fails if called twice.
    pub async fn initialize(&self) -> Result<(), UniboxError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| UniboxError::Storage {
            source: "read-state store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite read-state store initialized");
        Ok(())
    }

    fn db(&self) -> Result<&Database, UniboxError> {
        self.db.get().ok_or_else(|| UniboxError::Storage {
            source: "read-state store not initialized -- call initialize() first".into(),
        })
    }

    /// Round-trips a trivial query through the connection thread.
    pub async fn health_check(&self) -> Result<(), UniboxError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint the WAL. Safe to call when never initialized.
    pub async fn close(&self) -> Result<(), UniboxError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("read-state WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ReadStateStore for SqliteReadStateStore {
    async fn get(&self, key: &ReadStateKey) -> Result<Option<Baseline>, UniboxError> {
        queries::read_state::get_baseline(self.db()?, key).await
    }

    async fn set(&self, key: &ReadStateKey, baseline: Baseline) -> Result<(), UniboxError> {
        queries::read_state::upsert_baseline(self.db()?, key, baseline).await
    }

    async fn list(&self, channel: Channel) -> Result<Vec<(String, Baseline)>, UniboxError> {
        queries::read_state::list_baselines(self.db()?, channel).await
    }
}
