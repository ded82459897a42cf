// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcasts complete unread snapshots to any number of observers.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::debug;
use unibox_core::UnreadSnapshot;

/// Latest-value broadcaster for [`UnreadSnapshot`]s.
///
/// Observers only ever see whole snapshots, so per-channel totals and the
/// combined total always agree.
#[derive(Debug)]
pub struct UnreadPublisher {
    tx: watch::Sender<UnreadSnapshot>,
    closed: AtomicBool,
}

impl Default for UnreadPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl UnreadPublisher {
    /// Starts with an all-zero snapshot at revision 0.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(UnreadSnapshot::default());
        Self {
            tx,
            closed: AtomicBool::new(false),
        }
    }

    /// Publishes a snapshot. Returns false (and drops it) once closed.
    pub fn publish(&self, snapshot: UnreadSnapshot) -> bool {
        if self.closed.load(Ordering::Acquire) {
            debug!(revision = snapshot.revision(), "publisher closed; dropping snapshot");
            return false;
        }
        debug!(
            revision = snapshot.revision(),
            social_network = snapshot.per_channel().social_network,
            chat = snapshot.per_channel().chat,
            email = snapshot.per_channel().email,
            combined = snapshot.combined(),
            "unread totals published"
        );
        self.tx.send_replace(snapshot);
        true
    }

    pub fn current(&self) -> UnreadSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> UnreadWatcher {
        UnreadWatcher {
            rx: self.tx.subscribe(),
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Observer handle returned by [`UnreadPublisher::subscribe`].
#[derive(Debug, Clone)]
pub struct UnreadWatcher {
    rx: watch::Receiver<UnreadSnapshot>,
}

impl UnreadWatcher {
    /// The most recent snapshot, marking it seen.
    pub fn current(&mut self) -> UnreadSnapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Waits for a snapshot newer than the last one seen.
    ///
    /// Returns `None` once the publisher is gone.
    pub async fn changed(&mut self) -> Option<UnreadSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until a snapshot satisfies `predicate` (checking the current one first).
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&UnreadSnapshot) -> bool,
    ) -> Option<UnreadSnapshot> {
        let snapshot = self.rx.wait_for(|s| predicate(s)).await.ok()?;
        Some(snapshot.clone())
    }
}
