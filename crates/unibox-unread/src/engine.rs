// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unread reconciliation engine.
//!
//! Owns the per-channel notification lists and totals, applies feed batches,
//! performs mark-as-read, and publishes a fresh snapshot after every change.
//! All state mutations happen under one lock and publish before releasing it.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use unibox_config::model::UnreadConfig;
use unibox_core::{
    Baseline, Channel, ChannelBackend, ConversationNotification, ReadStateKey, ReadStateStore,
    SnapshotBatch, UniboxError, UnreadSnapshot,
};

use crate::publisher::{UnreadPublisher, UnreadWatcher};
use crate::reconcile;
use crate::state::UnreadState;

/// Tunables for reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Keep the previous Chat total when a single Chat batch reports zero unread.
    pub chat_zero_guard: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            chat_zero_guard: true,
        }
    }
}

impl From<&UnreadConfig> for EngineOptions {
    fn from(config: &UnreadConfig) -> Self {
        Self {
            chat_zero_guard: config.chat_zero_guard,
        }
    }
}

/// One mutex per channel, held for the whole of a mark-read.
#[derive(Debug, Default)]
struct ChannelLocks {
    social_network: Mutex<()>,
    chat: Mutex<()>,
    email: Mutex<()>,
}

impl ChannelLocks {
    async fn lock(&self, channel: Channel) -> MutexGuard<'_, ()> {
        match channel {
            Channel::SocialNetwork => self.social_network.lock().await,
            Channel::Chat => self.chat.lock().await,
            Channel::Email => self.email.lock().await,
        }
    }
}

struct EngineInner {
    store: Arc<dyn ReadStateStore>,
    backend: Arc<dyn ChannelBackend>,
    options: EngineOptions,
    state: Mutex<UnreadState>,
    channel_locks: ChannelLocks,
    publisher: UnreadPublisher,
    shutdown: CancellationToken,
}

/// Aggregates unread state across channels. Cheap to clone.
#[derive(Clone)]
pub struct UnreadEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for UnreadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnreadEngine")
            .field("options", &self.inner.options)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

impl UnreadEngine {
    pub fn new(
        store: Arc<dyn ReadStateStore>,
        backend: Arc<dyn ChannelBackend>,
        options: EngineOptions,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                backend,
                options,
                state: Mutex::new(UnreadState::default()),
                channel_locks: ChannelLocks::default(),
                publisher: UnreadPublisher::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> UnreadSnapshot {
        self.inner.publisher.current()
    }

    /// Observe every future snapshot.
    pub fn watch(&self) -> UnreadWatcher {
        self.inner.publisher.subscribe()
    }

    /// Token cancelled by [`UnreadEngine::shutdown`]; feed tasks derive from it.
    pub(crate) fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Stops feeds and publishing. In-flight mark-read calls finish their
    /// network work but leave state untouched.
    pub fn shutdown(&self) {
        if !self.inner.shutdown.is_cancelled() {
            info!("unread engine shutting down");
        }
        self.inner.shutdown.cancel();
        self.inner.publisher.close();
    }

    /// Replaces a channel's notification list with `batch` and republishes.
    ///
    /// Returns the snapshot in effect afterwards. A SocialNetwork batch whose
    /// baselines cannot be read is discarded and the error returned.
    pub async fn apply_batch(&self, batch: SnapshotBatch) -> Result<UnreadSnapshot, UniboxError> {
        let channel = batch.channel;

        // SocialNetwork reads baselines; hold its mark-read lock so a
        // concurrent acknowledgement cannot slip between read and apply.
        let _op = match channel {
            Channel::SocialNetwork => Some(self.inner.channel_locks.lock(channel).await),
            Channel::Chat | Channel::Email => None,
        };

        let prepared = match channel {
            Channel::SocialNetwork => {
                Some(reconcile::social_network(&batch, self.inner.store.as_ref()).await?)
            }
            Channel::Email => Some(reconcile::email(&batch)),
            Channel::Chat => None,
        };

        let mut state = self.inner.state.lock().await;
        if self.is_shut_down() {
            debug!(channel = %channel, "engine shut down; batch ignored");
            return Ok(self.snapshot());
        }

        let reconciled = match prepared {
            Some(reconciled) => reconciled,
            None => reconcile::chat(
                &batch,
                &mut state.chat_raw_counts,
                self.inner.options.chat_zero_guard,
            ),
        };
        debug!(
            channel = %channel,
            conversations = reconciled.entries.len(),
            total = reconciled.total,
            "batch applied"
        );
        state.replace(channel, reconciled);
        Ok(self.publish_locked(&mut state))
    }

    /// Acknowledges a conversation by channel name.
    ///
    /// Unknown channel names are logged and ignored. Never fails: every
    /// problem is logged and leaves the previous state in place.
    pub async fn mark_conversation_read(&self, conversation_id: &str, channel: &str) {
        match Channel::parse(channel) {
            Ok(channel) => self.mark_read(conversation_id, channel).await,
            Err(e) => {
                warn!(conversation_id, error = %e, "mark-read ignored");
            }
        }
    }

    /// Acknowledges a conversation so its unread count drops to zero.
    pub async fn mark_read(&self, conversation_id: &str, channel: Channel) {
        let _op = self.inner.channel_locks.lock(channel).await;
        if self.is_shut_down() {
            debug!(channel = %channel, conversation_id, "engine shut down; mark-read ignored");
            return;
        }

        let entry = {
            let state = self.inner.state.lock().await;
            state.entry(channel, conversation_id).cloned()
        };
        let Some(entry) = entry else {
            let err = UniboxError::ConversationNotFound {
                channel,
                id: conversation_id.to_string(),
            };
            warn!(error = %err, "mark-read ignored");
            return;
        };

        match channel {
            Channel::SocialNetwork => self.mark_social_network_read(entry).await,
            Channel::Chat => self.mark_chat_read(entry).await,
            Channel::Email => self.mark_email_read(entry).await,
        }
    }

    async fn mark_social_network_read(&self, entry: ConversationNotification) {
        let channel = Channel::SocialNetwork;
        let id = entry.conversation_id.as_str();
        let baseline = Baseline::new(entry.server_counter);
        if let Err(e) = self
            .inner
            .store
            .set(&ReadStateKey::new(channel, id), baseline)
            .await
        {
            warn!(channel = %channel, conversation_id = id, error = %e, "failed to store read baseline");
            return;
        }

        let mut state = self.inner.state.lock().await;
        if self.is_shut_down() {
            return;
        }
        state.acknowledge(channel, id, baseline.counter);
        state.recompute_total(channel);
        debug!(channel = %channel, conversation_id = id, baseline = baseline.counter, "conversation marked read");
        self.publish_locked(&mut state);
    }

    async fn mark_chat_read(&self, entry: ConversationNotification) {
        let channel = Channel::Chat;
        let id = entry.conversation_id.as_str();
        let backend = &self.inner.backend;

        match backend.fetch_conversations(channel).await {
            Ok(conversations) => {
                let current = conversations
                    .iter()
                    .find(|c| c.conversation_id == id)
                    .map(|c| c.counter);
                debug!(channel = %channel, conversation_id = id, unread = ?current, "resynced before mark-read");
            }
            Err(e) => {
                warn!(
                    channel = %channel,
                    conversation_id = id,
                    unread = entry.derived_unread,
                    error = %e,
                    "resync failed; using in-memory unread"
                );
            }
        }

        if let Err(e) = self
            .inner
            .store
            .set(&ReadStateKey::new(channel, id), Baseline::ZERO)
            .await
        {
            warn!(channel = %channel, conversation_id = id, error = %e, "failed to store read baseline");
        }

        if let Err(e) = backend.mark_read(channel, id).await {
            warn!(channel = %channel, conversation_id = id, error = %e, "backend mark-read failed");
        }

        let unread_total = backend.fetch_unread_count(channel).await;

        let mut state = self.inner.state.lock().await;
        if self.is_shut_down() {
            return;
        }
        state.acknowledge(channel, id, 0);
        match unread_total {
            Ok(total) => {
                state.set_total(channel, total);
                if let Some(raw) = state.chat_raw_counts.get_mut(id) {
                    *raw = 0;
                }
                debug!(channel = %channel, conversation_id = id, total, "conversation marked read");
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "unread count refresh failed; keeping chat total");
            }
        }
        self.publish_locked(&mut state);
    }

    /// Clears an Email conversation. The channel total becomes the sum of
    /// the remaining derived counts; a previously stored record for the
    /// conversation does not enter the arithmetic.
    async fn mark_email_read(&self, entry: ConversationNotification) {
        let channel = Channel::Email;
        let id = entry.conversation_id.as_str();
        let key = ReadStateKey::new(channel, id);

        if let Err(e) = self.inner.backend.mark_read(channel, id).await {
            warn!(channel = %channel, conversation_id = id, error = %e, "backend mark-read failed");
        }

        if let Err(e) = self.inner.store.set(&key, Baseline::ZERO).await {
            warn!(channel = %channel, conversation_id = id, error = %e, "failed to store read baseline");
        }

        let mut state = self.inner.state.lock().await;
        if self.is_shut_down() {
            return;
        }
        let cleared = state.acknowledge(channel, id, 0);
        state.recompute_total(channel);
        debug!(channel = %channel, conversation_id = id, cleared = ?cleared, "conversation marked read");
        self.publish_locked(&mut state);
    }

    /// Builds and publishes a snapshot while the caller holds the state lock.
    fn publish_locked(&self, state: &mut UnreadState) -> UnreadSnapshot {
        let snapshot = state.next_snapshot();
        self.inner.publisher.publish(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use unibox_core::{ConversationCounter, OutboundMessage, ThreadMessage};
    use unibox_storage::MemoryReadStateStore;

    /// Backend that answers every call successfully with fixed data.
    struct StaticBackend {
        unread_total: u64,
    }

    #[async_trait]
    impl ChannelBackend for StaticBackend {
        async fn fetch_conversations(
            &self,
            _channel: Channel,
        ) -> Result<Vec<ConversationCounter>, UniboxError> {
            Ok(Vec::new())
        }

        async fn fetch_messages(
            &self,
            _channel: Channel,
            _conversation_id: &str,
        ) -> Result<Vec<ThreadMessage>, UniboxError> {
            Ok(Vec::new())
        }

        async fn send_message(&self, _message: &OutboundMessage) -> Result<(), UniboxError> {
            Ok(())
        }

        async fn mark_read(&self, _channel: Channel, _id: &str) -> Result<(), UniboxError> {
            Ok(())
        }

        async fn fetch_unread_count(&self, _channel: Channel) -> Result<u64, UniboxError> {
            Ok(self.unread_total)
        }
    }

    fn engine(unread_total: u64) -> UnreadEngine {
        UnreadEngine::new(
            Arc::new(MemoryReadStateStore::new()),
            Arc::new(StaticBackend { unread_total }),
            EngineOptions::default(),
        )
    }

    fn batch(channel: Channel, counters: &[(&str, u64)]) -> SnapshotBatch {
        SnapshotBatch::new(
            channel,
            counters
                .iter()
                .map(|(id, n)| ConversationCounter::new(*id, *n))
                .collect(),
        )
    }

    #[tokio::test]
    async fn batches_for_one_channel_leave_others_alone() {
        let engine = engine(0);
        engine
            .apply_batch(batch(Channel::Email, &[("e1", 2)]))
            .await
            .unwrap();
        let snapshot = engine
            .apply_batch(batch(Channel::Chat, &[("c1", 3)]))
            .await
            .unwrap();

        assert_eq!(snapshot.channel_total(Channel::Email), 2);
        assert_eq!(snapshot.channel_total(Channel::Chat), 3);
        assert_eq!(snapshot.combined(), 5);
        assert_eq!(snapshot.revision(), 2);
    }

    #[tokio::test]
    async fn batch_replaces_previous_list() {
        let engine = engine(0);
        engine
            .apply_batch(batch(Channel::Email, &[("e1", 2), ("e2", 1)]))
            .await
            .unwrap();
        let snapshot = engine
            .apply_batch(batch(Channel::Email, &[("e3", 1)]))
            .await
            .unwrap();

        assert_eq!(snapshot.notifications(Channel::Email).len(), 1);
        assert!(snapshot.notification(Channel::Email, "e1").is_none());
    }

    #[tokio::test]
    async fn chat_mark_read_takes_server_total() {
        let engine = engine(1);
        engine
            .apply_batch(batch(Channel::Chat, &[("a", 3), ("b", 1)]))
            .await
            .unwrap();

        engine.mark_read("a", Channel::Chat).await;

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.channel_total(Channel::Chat), 1);
        assert_eq!(snapshot.notification(Channel::Chat, "a").unwrap().derived_unread, 0);
        assert_eq!(snapshot.combined(), 1);
    }

    #[tokio::test]
    async fn nothing_changes_after_shutdown() {
        let engine = engine(0);
        engine
            .apply_batch(batch(Channel::Email, &[("e1", 2)]))
            .await
            .unwrap();
        engine.shutdown();

        let after = engine
            .apply_batch(batch(Channel::Email, &[("e1", 9)]))
            .await
            .unwrap();
        engine.mark_read("e1", Channel::Email).await;

        assert_eq!(after.channel_total(Channel::Email), 2);
        assert_eq!(engine.snapshot().channel_total(Channel::Email), 2);
        assert!(engine.is_shut_down());
    }
}
