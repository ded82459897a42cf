// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Unibox unified inbox.
//!
//! This crate provides the error type, the domain types describing channels,
//! conversation counters and unread snapshots, and the collaborator traits
//! (feeds, backends, read-state store) that the unread engine is written
//! against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::UniboxError;
pub use types::{
    Baseline, Channel, ConversationCounter, ConversationNotification, OutboundMessage,
    ReadStateKey, SnapshotBatch, ThreadMessage, UnreadCounts, UnreadSnapshot,
};

pub use traits::{BatchStream, ChannelBackend, NotificationFeed, ReadStateStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unibox_error_has_all_variants() {
        let _config = UniboxError::Config("test".into());
        let _storage = UniboxError::storage(std::io::Error::other("test"));
        let _transport = UniboxError::Transport {
            channel: Channel::Chat,
            message: "test".into(),
            source: None,
        };
        let _malformed = UniboxError::MalformedPayload {
            channel: Channel::Email,
            message: "test".into(),
        };
        let _rejected = UniboxError::Rejected {
            channel: Channel::Chat,
            message: "test".into(),
        };
        let _unsupported_channel = UniboxError::UnsupportedChannel("sms".into());
        let _unsupported = UniboxError::Unsupported {
            channel: Channel::SocialNetwork,
            operation: "mark_read",
        };
        let _missing = UniboxError::ConversationNotFound {
            channel: Channel::Chat,
            id: "ghost".into(),
        };
        let _internal = UniboxError::Internal("test".into());
    }

    #[test]
    fn transient_errors_are_classified() {
        let transport = UniboxError::Transport {
            channel: Channel::Chat,
            message: "connection reset".into(),
            source: None,
        };
        assert!(transport.is_transient());
        assert!(!UniboxError::UnsupportedChannel("sms".into()).is_transient());
    }

    #[test]
    fn error_messages_name_the_channel() {
        let err = UniboxError::Unsupported {
            channel: Channel::SocialNetwork,
            operation: "fetch_unread_count",
        };
        assert_eq!(
            err.to_string(),
            "social_network does not support fetch_unread_count"
        );
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_store<T: ReadStateStore>() {}
        fn _assert_feed<T: NotificationFeed>() {}
        fn _assert_backend<T: ChannelBackend>() {}
    }
}
