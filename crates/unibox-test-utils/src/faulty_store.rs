// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-state store wrapper with switchable failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use unibox_core::{Baseline, Channel, ReadStateKey, ReadStateStore, UniboxError};
use unibox_storage::MemoryReadStateStore;

/// Delegates to an inner store unless reads or writes are switched to fail.
pub struct FaultyReadStateStore {
    inner: Arc<dyn ReadStateStore>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FaultyReadStateStore {
    pub fn new(inner: Arc<dyn ReadStateStore>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Wraps a fresh [`MemoryReadStateStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryReadStateStore::new()))
    }

    pub fn inner(&self) -> &Arc<dyn ReadStateStore> {
        &self.inner
    }

    /// `get` and `list` fail while set.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// `set` fails while set.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn injected(kind: &str) -> UniboxError {
        UniboxError::storage(std::io::Error::other(format!("injected {kind} failure")))
    }
}

#[async_trait]
impl ReadStateStore for FaultyReadStateStore {
    async fn get(&self, key: &ReadStateKey) -> Result<Option<Baseline>, UniboxError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("read"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &ReadStateKey, baseline: Baseline) -> Result<(), UniboxError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("write"));
        }
        self.inner.set(key, baseline).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list(&self, channel: Channel) -> Result<Vec<(String, Baseline)>, UniboxError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("read"));
        }
        self.inner.list(channel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failures_toggle_independently() {
        let store = FaultyReadStateStore::in_memory();
        let key = ReadStateKey::new(Channel::SocialNetwork, "t1");

        store.set_fail_writes(true);
        assert!(store.set(&key, Baseline::new(4)).await.is_err());
        assert_eq!(store.get(&key).await.unwrap(), None);

        store.set_fail_writes(false);
        store.set(&key, Baseline::new(4)).await.unwrap();
        store.set_fail_reads(true);
        assert!(store.get(&key).await.is_err());
        assert!(store.list(Channel::SocialNetwork).await.is_err());

        store.set_fail_reads(false);
        assert_eq!(store.get(&key).await.unwrap(), Some(Baseline::new(4)));
        assert_eq!(store.write_count(), 1);
    }
}
