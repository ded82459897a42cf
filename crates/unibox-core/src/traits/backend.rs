// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request/response access to a channel's messaging backend.

use async_trait::async_trait;

use crate::error::UniboxError;
use crate::types::{Channel, ConversationCounter, OutboundMessage, ThreadMessage};

/// Thin request/response client for the three messaging backends.
///
/// Operations a channel has no endpoint for return [`UniboxError::Unsupported`].
#[async_trait]
pub trait ChannelBackend: Send + Sync + 'static {
    /// Lists the channel's conversations with their current counters.
    async fn fetch_conversations(
        &self,
        channel: Channel,
    ) -> Result<Vec<ConversationCounter>, UniboxError>;

    /// Fetches the messages of one conversation.
    async fn fetch_messages(
        &self,
        channel: Channel,
        conversation_id: &str,
    ) -> Result<Vec<ThreadMessage>, UniboxError>;

    /// Delivers a message through the channel.
    async fn send_message(&self, message: &OutboundMessage) -> Result<(), UniboxError>;

    /// Acknowledges a conversation as read on the server (Chat and Email).
    async fn mark_read(&self, channel: Channel, conversation_id: &str) -> Result<(), UniboxError>;

    /// Authoritative unread total for the channel (Chat).
    async fn fetch_unread_count(&self, channel: Channel) -> Result<u64, UniboxError>;
}
