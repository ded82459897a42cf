// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel backend for deterministic testing.
//!
//! `MockBackend` implements `ChannelBackend` with scripted replies. Every call
//! is captured for later inspection, and any operation can be made to fail.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use unibox_core::{
    Channel, ChannelBackend, ConversationCounter, OutboundMessage, ThreadMessage, UniboxError,
};

/// The backend operations, used to target failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    FetchConversations,
    FetchMessages,
    SendMessage,
    MarkRead,
    FetchUnreadCount,
}

/// A captured backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    FetchConversations(Channel),
    FetchMessages(Channel, String),
    SendMessage(OutboundMessage),
    MarkRead(Channel, String),
    FetchUnreadCount(Channel),
}

impl BackendCall {
    pub fn operation(&self) -> MockOperation {
        match self {
            Self::FetchConversations(_) => MockOperation::FetchConversations,
            Self::FetchMessages(..) => MockOperation::FetchMessages,
            Self::SendMessage(_) => MockOperation::SendMessage,
            Self::MarkRead(..) => MockOperation::MarkRead,
            Self::FetchUnreadCount(_) => MockOperation::FetchUnreadCount,
        }
    }
}

/// A backend that answers from scripted data.
///
/// Like the HTTP backend, SocialNetwork has no server-side mark-read and only
/// Chat reports an unread total; those calls return `Unsupported`.
#[derive(Default)]
pub struct MockBackend {
    conversations: Arc<Mutex<HashMap<Channel, Vec<ConversationCounter>>>>,
    messages: Arc<Mutex<HashMap<(Channel, String), Vec<ThreadMessage>>>>,
    unread_counts: Arc<Mutex<HashMap<Channel, u64>>>,
    failures: Arc<Mutex<HashSet<MockOperation>>>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply of `fetch_conversations` for a channel.
    pub async fn set_conversations(&self, channel: Channel, counters: &[(&str, u64)]) {
        let counters = counters
            .iter()
            .map(|(id, counter)| ConversationCounter::new(*id, *counter))
            .collect();
        self.conversations.lock().await.insert(channel, counters);
    }

    /// Script the messages of one conversation.
    pub async fn set_messages(
        &self,
        channel: Channel,
        conversation_id: &str,
        messages: Vec<ThreadMessage>,
    ) {
        self.messages
            .lock()
            .await
            .insert((channel, conversation_id.to_string()), messages);
    }

    /// Script the reply of `fetch_unread_count`. Unscripted channels report 0.
    pub async fn set_unread_count(&self, channel: Channel, count: u64) {
        self.unread_counts.lock().await.insert(channel, count);
    }

    /// Make every subsequent call of `operation` fail with a transport error.
    pub async fn fail(&self, operation: MockOperation) {
        self.failures.lock().await.insert(operation);
    }

    /// Undo [`fail`](Self::fail).
    pub async fn recover(&self, operation: MockOperation) {
        self.failures.lock().await.remove(&operation);
    }

    /// All captured calls, oldest first.
    pub async fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().await.clone()
    }

    /// Captured calls of one operation.
    pub async fn calls_of(&self, operation: MockOperation) -> Vec<BackendCall> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.operation() == operation)
            .cloned()
            .collect()
    }

    /// Messages handed to `send_message`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                BackendCall::SendMessage(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    /// Record `call`, then fail if its operation is marked failing.
    async fn record(&self, channel: Channel, call: BackendCall) -> Result<(), UniboxError> {
        let operation = call.operation();
        self.calls.lock().await.push(call);
        if self.failures.lock().await.contains(&operation) {
            return Err(UniboxError::Transport {
                channel,
                message: format!("injected {operation:?} failure"),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelBackend for MockBackend {
    async fn fetch_conversations(
        &self,
        channel: Channel,
    ) -> Result<Vec<ConversationCounter>, UniboxError> {
        self.record(channel, BackendCall::FetchConversations(channel))
            .await?;
        Ok(self
            .conversations
            .lock()
            .await
            .get(&channel)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_messages(
        &self,
        channel: Channel,
        conversation_id: &str,
    ) -> Result<Vec<ThreadMessage>, UniboxError> {
        self.record(
            channel,
            BackendCall::FetchMessages(channel, conversation_id.to_string()),
        )
        .await?;
        self.messages
            .lock()
            .await
            .get(&(channel, conversation_id.to_string()))
            .cloned()
            .ok_or_else(|| UniboxError::ConversationNotFound {
                channel,
                id: conversation_id.to_string(),
            })
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<(), UniboxError> {
        self.record(message.channel, BackendCall::SendMessage(message.clone()))
            .await
    }

    async fn mark_read(&self, channel: Channel, conversation_id: &str) -> Result<(), UniboxError> {
        self.record(
            channel,
            BackendCall::MarkRead(channel, conversation_id.to_string()),
        )
        .await?;
        if channel == Channel::SocialNetwork {
            return Err(UniboxError::Unsupported {
                channel,
                operation: "mark_read",
            });
        }
        Ok(())
    }

    async fn fetch_unread_count(&self, channel: Channel) -> Result<u64, UniboxError> {
        self.record(channel, BackendCall::FetchUnreadCount(channel))
            .await?;
        if channel != Channel::Chat {
            return Err(UniboxError::Unsupported {
                channel,
                operation: "fetch_unread_count",
            });
        }
        Ok(self
            .unread_counts
            .lock()
            .await
            .get(&channel)
            .copied()
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_replies_and_call_capture() {
        let backend = MockBackend::new();
        backend
            .set_conversations(Channel::Chat, &[("c1", 3), ("c2", 0)])
            .await;
        backend.set_unread_count(Channel::Chat, 3).await;

        let conversations = backend.fetch_conversations(Channel::Chat).await.unwrap();
        assert_eq!(conversations.len(), 2);
        assert_eq!(backend.fetch_unread_count(Channel::Chat).await.unwrap(), 3);
        backend.mark_read(Channel::Chat, "c1").await.unwrap();

        assert_eq!(
            backend.calls().await,
            vec![
                BackendCall::FetchConversations(Channel::Chat),
                BackendCall::FetchUnreadCount(Channel::Chat),
                BackendCall::MarkRead(Channel::Chat, "c1".into()),
            ]
        );
    }

    #[tokio::test]
    async fn injected_failures_can_be_cleared() {
        let backend = MockBackend::new();
        backend.fail(MockOperation::MarkRead).await;
        assert!(backend.mark_read(Channel::Email, "e1").await.is_err());

        backend.recover(MockOperation::MarkRead).await;
        assert!(backend.mark_read(Channel::Email, "e1").await.is_ok());
        assert_eq!(backend.calls_of(MockOperation::MarkRead).await.len(), 2);
    }

    #[tokio::test]
    async fn social_network_has_no_server_mark_read() {
        let backend = MockBackend::new();
        let err = backend
            .mark_read(Channel::SocialNetwork, "t1")
            .await
            .unwrap_err();
        assert!(matches!(err, UniboxError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn unknown_thread_is_not_found() {
        let backend = MockBackend::new();
        let err = backend
            .fetch_messages(Channel::Email, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, UniboxError::ConversationNotFound { .. }));
    }

    #[tokio::test]
    async fn sent_messages_are_captured() {
        let backend = MockBackend::new();
        let message = OutboundMessage::new(Channel::Chat, "+15550100", "hello");
        backend.send_message(&message).await.unwrap();
        assert_eq!(backend.sent_messages().await, vec![message]);
    }
}
