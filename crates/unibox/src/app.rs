// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring shared by the commands: read-state store, HTTP backend, engine.

use std::sync::Arc;

use tracing::{debug, info, warn};

use unibox_backend::HttpBackend;
use unibox_config::model::UniboxConfig;
use unibox_core::{
    Channel, ChannelBackend, ReadStateStore, SnapshotBatch, UniboxError, UnreadCounts,
    UnreadSnapshot,
};
use unibox_storage::{MemoryReadStateStore, SqliteReadStateStore};
use unibox_unread::{EngineOptions, UnreadEngine};

/// An engine wired to the configured backend and read-state store.
pub struct App {
    pub backend: Arc<HttpBackend>,
    pub engine: UnreadEngine,
    store: Arc<dyn ReadStateStore>,
    sqlite: Option<Arc<SqliteReadStateStore>>,
}

impl App {
    /// Opens the SQLite store (or a memory store when `ephemeral`) and
    /// builds the engine.
    pub async fn open(config: &UniboxConfig, ephemeral: bool) -> Result<Self, UniboxError> {
        let backend = Arc::new(HttpBackend::new(&config.backend)?);

        let (sqlite, store): (_, Arc<dyn ReadStateStore>) = if ephemeral {
            info!("ephemeral mode: read state will not be persisted");
            let store: Arc<dyn ReadStateStore> = Arc::new(MemoryReadStateStore::new());
            (None, store)
        } else {
            let sqlite = Arc::new(SqliteReadStateStore::open(config.storage.clone()).await?);
            sqlite.health_check().await?;
            info!(path = %config.storage.database_path, "read-state store opened");
            let store: Arc<dyn ReadStateStore> = sqlite.clone();
            (Some(sqlite), store)
        };

        let engine = UnreadEngine::new(
            store.clone(),
            backend.clone(),
            EngineOptions::from(&config.unread),
        );
        Ok(Self {
            backend,
            engine,
            store,
            sqlite,
        })
    }

    /// Lists a channel's conversations over HTTP and applies them exactly as
    /// a feed batch would be.
    pub async fn refresh(&self, channel: Channel) -> Result<UnreadSnapshot, UniboxError> {
        let counters = self.backend.fetch_conversations(channel).await?;
        debug!(channel = %channel, conversations = counters.len(), "conversations fetched");
        self.engine
            .apply_batch(SnapshotBatch::new(channel, counters))
            .await
    }

    /// Refreshes every channel. Channels whose listing failed are returned
    /// alongside the final snapshot; their totals stay at zero.
    pub async fn refresh_all(&self) -> (UnreadSnapshot, Vec<Channel>) {
        let mut unavailable = Vec::new();
        for channel in Channel::ALL {
            if let Err(e) = self.refresh(channel).await {
                warn!(channel = %channel, error = %e, "channel unavailable");
                unavailable.push(channel);
            }
        }
        (self.engine.snapshot(), unavailable)
    }

    /// Number of conversations per channel with a stored read baseline.
    pub async fn acknowledged(&self) -> Result<UnreadCounts, UniboxError> {
        let mut counts = UnreadCounts::default();
        for channel in Channel::ALL {
            let stored = self.store.list(channel).await?;
            counts.set(channel, stored.len() as u64);
        }
        Ok(counts)
    }

    /// Shuts the engine down and checkpoints the store.
    pub async fn close(self) -> Result<(), UniboxError> {
        self.engine.shutdown();
        if let Some(sqlite) = self.sqlite {
            sqlite.close().await?;
        }
        Ok(())
    }
}

/// Config pointing at a test server and a temp database.
#[cfg(test)]
pub(crate) fn test_config(base_url: &str, db: &std::path::Path) -> UniboxConfig {
    let mut config = UniboxConfig::default();
    config.backend.base_url = base_url.to_string();
    config.backend.request_timeout_secs = 5;
    config.storage.database_path = db.display().to_string();
    config
}
