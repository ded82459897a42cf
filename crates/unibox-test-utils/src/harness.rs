// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end engine testing.
//!
//! `TestHarness` wires an [`UnreadEngine`] to a [`MockBackend`] and a
//! [`FaultyReadStateStore`] over a temp SQLite database (or memory), and can
//! restart the engine against the same store to exercise persistence.

use std::path::PathBuf;
use std::sync::Arc;

use unibox_config::model::StorageConfig;
use unibox_core::{
    Baseline, Channel, ConversationCounter, ReadStateKey, ReadStateStore, SnapshotBatch,
    UniboxError, UnreadSnapshot,
};
use unibox_storage::{MemoryReadStateStore, SqliteReadStateStore};
use unibox_unread::{EngineOptions, UnreadEngine};

use crate::faulty_store::FaultyReadStateStore;
use crate::mock_backend::MockBackend;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    options: EngineOptions,
    baselines: Vec<(ReadStateKey, Baseline)>,
    unread_counts: Vec<(Channel, u64)>,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            options: EngineOptions::default(),
            baselines: Vec::new(),
            unread_counts: Vec::new(),
            sqlite: true,
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_chat_zero_guard(mut self, enabled: bool) -> Self {
        self.options.chat_zero_guard = enabled;
        self
    }

    /// Seed a stored baseline before the engine starts.
    pub fn with_baseline(mut self, channel: Channel, conversation_id: &str, counter: u64) -> Self {
        self.baselines.push((
            ReadStateKey::new(channel, conversation_id),
            Baseline::new(counter),
        ));
        self
    }

    /// Script the backend's authoritative unread total for a channel.
    pub fn with_unread_count(mut self, channel: Channel, count: u64) -> Self {
        self.unread_counts.push((channel, count));
        self
    }

    /// Keep read state in memory instead of a temp SQLite file.
    pub fn in_memory(mut self) -> Self {
        self.sqlite = false;
        self
    }

    /// Build the harness, creating the temp database if needed.
    pub async fn build(self) -> Result<TestHarness, UniboxError> {
        let backend = Arc::new(MockBackend::new());
        for (channel, count) in self.unread_counts {
            backend.set_unread_count(channel, count).await;
        }

        let (temp_dir, sqlite, inner): (_, _, Arc<dyn ReadStateStore>) = if self.sqlite {
            let temp_dir = tempfile::TempDir::new().map_err(UniboxError::storage)?;
            let db_path = temp_dir.path().join("read_state.db");
            let sqlite = Arc::new(open_sqlite(&db_path).await?);
            let inner: Arc<dyn ReadStateStore> = sqlite.clone();
            (Some(temp_dir), Some(sqlite), inner)
        } else {
            let inner: Arc<dyn ReadStateStore> = Arc::new(MemoryReadStateStore::new());
            (None, None, inner)
        };

        let store = Arc::new(FaultyReadStateStore::new(inner));
        for (key, baseline) in &self.baselines {
            store.set(key, *baseline).await?;
        }

        let engine = UnreadEngine::new(store.clone(), backend.clone(), self.options);
        Ok(TestHarness {
            engine,
            backend,
            store,
            options: self.options,
            sqlite,
            _temp_dir: temp_dir,
        })
    }
}

async fn open_sqlite(path: &std::path::Path) -> Result<SqliteReadStateStore, UniboxError> {
    SqliteReadStateStore::open(StorageConfig {
        database_path: path.display().to_string(),
        wal_mode: true,
    })
    .await
}

/// An engine plus handles to its collaborators for driving and asserting.
pub struct TestHarness {
    /// The engine under test.
    pub engine: UnreadEngine,
    /// Scripted backend; inspect its calls after mark-read.
    pub backend: Arc<MockBackend>,
    /// Read-state store with switchable failures.
    pub store: Arc<FaultyReadStateStore>,
    options: EngineOptions,
    sqlite: Option<Arc<SqliteReadStateStore>>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Apply a full batch of `(conversation_id, counter)` pairs for `channel`.
    pub async fn apply(
        &self,
        channel: Channel,
        counters: &[(&str, u64)],
    ) -> Result<UnreadSnapshot, UniboxError> {
        let counters = counters
            .iter()
            .map(|(id, counter)| ConversationCounter::new(*id, *counter))
            .collect();
        self.engine
            .apply_batch(SnapshotBatch::new(channel, counters))
            .await
    }

    /// The stored baseline for a conversation, read past any injected failure.
    pub async fn baseline(
        &self,
        channel: Channel,
        conversation_id: &str,
    ) -> Result<Option<Baseline>, UniboxError> {
        self.store
            .inner()
            .get(&ReadStateKey::new(channel, conversation_id))
            .await
    }

    /// Path of the temp database, if the harness uses SQLite.
    pub fn database_path(&self) -> Option<PathBuf> {
        self._temp_dir
            .as_ref()
            .map(|dir| dir.path().join("read_state.db"))
    }

    /// Shut the engine down and start a fresh one over the same persisted
    /// read state, as a process restart would. The backend is kept.
    pub async fn restart(self) -> Result<TestHarness, UniboxError> {
        self.engine.shutdown();

        let (sqlite, inner): (_, Arc<dyn ReadStateStore>) =
            match (&self.sqlite, self.database_path()) {
                (Some(old), Some(path)) => {
                    old.close().await?;
                    let reopened = Arc::new(open_sqlite(&path).await?);
                    let inner: Arc<dyn ReadStateStore> = reopened.clone();
                    (Some(reopened), inner)
                }
                _ => (None, self.store.inner().clone()),
            };

        let store = Arc::new(FaultyReadStateStore::new(inner));
        let engine = UnreadEngine::new(store.clone(), self.backend.clone(), self.options);
        Ok(TestHarness {
            engine,
            backend: self.backend,
            store,
            options: self.options,
            sqlite,
            _temp_dir: self._temp_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert_eq!(harness.engine.snapshot().combined(), 0);
        assert!(harness.database_path().unwrap().exists());
    }

    #[tokio::test]
    async fn seeded_baselines_are_stored() {
        let harness = TestHarness::builder()
            .in_memory()
            .with_baseline(Channel::SocialNetwork, "t1", 5)
            .build()
            .await
            .unwrap();
        assert_eq!(
            harness.baseline(Channel::SocialNetwork, "t1").await.unwrap(),
            Some(Baseline::new(5))
        );
        assert!(harness.database_path().is_none());
    }

    #[tokio::test]
    async fn restart_keeps_persisted_read_state() {
        let harness = TestHarness::builder()
            .with_baseline(Channel::SocialNetwork, "t1", 3)
            .build()
            .await
            .unwrap();
        let restarted = harness.restart().await.unwrap();
        assert_eq!(
            restarted
                .baseline(Channel::SocialNetwork, "t1")
                .await
                .unwrap(),
            Some(Baseline::new(3))
        );
        assert_eq!(restarted.engine.snapshot().revision(), 0);
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();
        assert_ne!(h1.database_path(), h2.database_path());
    }
}
