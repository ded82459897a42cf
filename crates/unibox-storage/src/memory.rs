// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local read-state store. Nothing survives a restart.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use unibox_core::{Baseline, Channel, ReadStateKey, ReadStateStore, UniboxError};

/// In-memory [`ReadStateStore`] for `--ephemeral` runs and tests.
#[derive(Debug, Default)]
pub struct MemoryReadStateStore {
    entries: Mutex<BTreeMap<ReadStateKey, Baseline>>,
}

impl MemoryReadStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, handy for seeding baselines in tests.
    pub fn with_entries(entries: impl IntoIterator<Item = (ReadStateKey, Baseline)>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<ReadStateKey, Baseline>>, UniboxError> {
        self.entries
            .lock()
            .map_err(|_| UniboxError::Internal("read-state map poisoned".into()))
    }
}

#[async_trait]
impl ReadStateStore for MemoryReadStateStore {
    async fn get(&self, key: &ReadStateKey) -> Result<Option<Baseline>, UniboxError> {
        Ok(self.lock()?.get(key).copied())
    }

    async fn set(&self, key: &ReadStateKey, baseline: Baseline) -> Result<(), UniboxError> {
        self.lock()?.insert(key.clone(), baseline);
        Ok(())
    }

    async fn list(&self, channel: Channel) -> Result<Vec<(String, Baseline)>, UniboxError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|(key, _)| key.channel == channel)
            .map(|(key, baseline)| (key.conversation_id.clone(), *baseline))
            .collect())
    }
}
