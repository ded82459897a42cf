// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Unibox.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use unibox_core::Channel;

/// Top-level Unibox configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UniboxConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Messaging backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Local read-state store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Per-channel notification feed settings.
    #[serde(default)]
    pub feeds: FeedsConfig,

    /// Unread reconciliation settings.
    #[serde(default)]
    pub unread: UnreadConfig,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Connection settings for the HTTP backend serving all three channels.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the backend, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for request/response calls in seconds. Feeds are not subject to it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Local read-state store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("unibox").join("read_state.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("read_state.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Notification feed settings for all three channels.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedsConfig {
    #[serde(default = "default_social_network_feed")]
    pub social_network: FeedConfig,

    #[serde(default = "default_chat_feed")]
    pub chat: FeedConfig,

    #[serde(default = "default_email_feed")]
    pub email: FeedConfig,
}

impl FeedsConfig {
    /// Returns the feed settings for a channel.
    pub fn for_channel(&self, channel: Channel) -> &FeedConfig {
        match channel {
            Channel::SocialNetwork => &self.social_network,
            Channel::Chat => &self.chat,
            Channel::Email => &self.email,
        }
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            social_network: default_social_network_feed(),
            chat: default_chat_feed(),
            email: default_email_feed(),
        }
    }
}

/// A single server-sent event feed.
///
/// Missing keys are filled from the channel's defaults when loaded through
/// the layered loader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Whether to subscribe to this channel's feed.
    pub enabled: bool,

    /// Path of the SSE endpoint relative to `backend.base_url`.
    pub path: String,

    /// SSE event name carrying the conversation snapshot.
    pub event: String,
}

fn default_social_network_feed() -> FeedConfig {
    FeedConfig {
        enabled: true,
        path: "/facebook/notifications".to_string(),
        event: "facebookConversations".to_string(),
    }
}

fn default_chat_feed() -> FeedConfig {
    FeedConfig {
        enabled: true,
        path: "/whatsapp/notifications".to_string(),
        event: "whatsappConversations".to_string(),
    }
}

fn default_email_feed() -> FeedConfig {
    FeedConfig {
        enabled: true,
        path: "/email/notifications".to_string(),
        event: "emailConversations".to_string(),
    }
}

/// Unread reconciliation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UnreadConfig {
    /// Keep the previous Chat total when a single Chat batch reports zero
    /// unread everywhere. Pending product confirmation; disable to trust
    /// every Chat batch as-is.
    #[serde(default = "default_chat_zero_guard")]
    pub chat_zero_guard: bool,
}

impl Default for UnreadConfig {
    fn default() -> Self {
        Self {
            chat_zero_guard: default_chat_zero_guard(),
        }
    }
}

fn default_chat_zero_guard() -> bool {
    true
}
