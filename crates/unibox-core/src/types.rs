// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the feeds, the read-state store, and the unread engine.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::UniboxError;

/// One of the three integrated messaging backends.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[strum(
        to_string = "social_network",
        serialize = "socialnetwork",
        serialize = "facebook"
    )]
    SocialNetwork,
    #[strum(to_string = "chat", serialize = "whatsapp")]
    Chat,
    #[strum(to_string = "email", serialize = "mail")]
    Email,
}

impl Channel {
    /// All channels, in display order.
    pub const ALL: [Channel; 3] = [Channel::SocialNetwork, Channel::Chat, Channel::Email];

    /// Parses a channel name, rejecting anything outside the three backends.
    pub fn parse(name: &str) -> Result<Self, UniboxError> {
        Self::from_str(name.trim()).map_err(|_| UniboxError::UnsupportedChannel(name.to_string()))
    }
}

/// A per-conversation counter as pushed by a channel feed or returned by a
/// conversation listing. What `counter` means depends on the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationCounter {
    pub conversation_id: String,
    pub counter: u64,
    pub participant: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ConversationCounter {
    pub fn new(conversation_id: impl Into<String>, counter: u64) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            counter,
            participant: None,
            last_activity: None,
        }
    }
}

/// A complete, replace-in-full list of conversation counters for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBatch {
    pub channel: Channel,
    pub counters: Vec<ConversationCounter>,
}

impl SnapshotBatch {
    pub fn new(channel: Channel, counters: Vec<ConversationCounter>) -> Self {
        Self { channel, counters }
    }

    /// Sum of the raw counters, without any baseline applied.
    pub fn raw_sum(&self) -> u64 {
        self.counters
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.counter))
    }
}

/// Key of a row in the local read-state store.
///
/// Keys are namespaced by channel so identical conversation ids reported by
/// different backends never share a baseline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReadStateKey {
    pub channel: Channel,
    pub conversation_id: String,
}

impl ReadStateKey {
    pub fn new(channel: Channel, conversation_id: impl Into<String>) -> Self {
        Self {
            channel,
            conversation_id: conversation_id.into(),
        }
    }
}

impl fmt::Display for ReadStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel, self.conversation_id)
    }
}

/// The last acknowledged counter for a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub counter: u64,
}

impl Baseline {
    pub const ZERO: Baseline = Baseline { counter: 0 };

    pub fn new(counter: u64) -> Self {
        Self { counter }
    }
}

/// Reconciled unread state of one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationNotification {
    pub conversation_id: String,
    pub channel: Channel,
    /// Latest raw counter reported by the backend.
    pub server_counter: u64,
    /// Last acknowledged counter (meaningful for cumulative channels).
    pub baseline_counter: u64,
    pub derived_unread: u64,
    pub participant: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ConversationNotification {
    pub fn has_unread(&self) -> bool {
        self.derived_unread > 0
    }
}

/// Unread totals per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCounts {
    pub social_network: u64,
    pub chat: u64,
    pub email: u64,
}

impl UnreadCounts {
    pub fn get(&self, channel: Channel) -> u64 {
        match channel {
            Channel::SocialNetwork => self.social_network,
            Channel::Chat => self.chat,
            Channel::Email => self.email,
        }
    }

    pub fn set(&mut self, channel: Channel, total: u64) {
        match channel {
            Channel::SocialNetwork => self.social_network = total,
            Channel::Chat => self.chat = total,
            Channel::Email => self.email = total,
        }
    }

    /// The combined ("All") total.
    pub fn sum(&self) -> u64 {
        self.social_network
            .saturating_add(self.chat)
            .saturating_add(self.email)
    }
}

/// An immutable, internally consistent view of the unread state.
///
/// The combined total is derived from the per-channel totals at construction
/// and cannot be set independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnreadSnapshot {
    per_channel: UnreadCounts,
    combined: u64,
    notifications: BTreeMap<Channel, Vec<ConversationNotification>>,
    revision: u64,
}

impl UnreadSnapshot {
    pub fn new(
        per_channel: UnreadCounts,
        notifications: BTreeMap<Channel, Vec<ConversationNotification>>,
        revision: u64,
    ) -> Self {
        Self {
            per_channel,
            combined: per_channel.sum(),
            notifications,
            revision,
        }
    }

    pub fn per_channel(&self) -> UnreadCounts {
        self.per_channel
    }

    pub fn channel_total(&self, channel: Channel) -> u64 {
        self.per_channel.get(channel)
    }

    pub fn combined(&self) -> u64 {
        self.combined
    }

    pub fn notifications(&self, channel: Channel) -> &[ConversationNotification] {
        self.notifications
            .get(&channel)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn notification(
        &self,
        channel: Channel,
        conversation_id: &str,
    ) -> Option<&ConversationNotification> {
        self.notifications(channel)
            .iter()
            .find(|n| n.conversation_id == conversation_id)
    }

    /// Monotonic publish counter, incremented on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// A message inside a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: Option<String>,
    pub sender: String,
    pub body: String,
    pub sent_at: Option<DateTime<Utc>>,
}

/// A message to deliver through a channel backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub channel: Channel,
    /// Recipient id: page-scoped user id, phone number, or email address.
    pub recipient: String,
    pub text: String,
    /// Email only.
    pub subject: Option<String>,
    /// Email only: `Message-ID` of the message being replied to.
    pub reply_to: Option<String>,
}

impl OutboundMessage {
    pub fn new(channel: Channel, recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
            text: text.into(),
            subject: None,
            reply_to: None,
        }
    }
}
