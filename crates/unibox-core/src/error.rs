// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Unibox workspace.

use thiserror::Error;

use crate::types::Channel;

/// The primary error type used across all Unibox traits and core operations.
#[derive(Debug, Error)]
pub enum UniboxError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Read-state store errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Network failure talking to a channel backend or its event feed.
    #[error("{channel} transport error: {message}")]
    Transport {
        channel: Channel,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A backend payload (feed batch or response body) could not be decoded.
    #[error("{channel} malformed payload: {message}")]
    MalformedPayload { channel: Channel, message: String },

    /// The backend refused a request and explained why (e.g. an expired chat window).
    #[error("{channel} rejected request: {message}")]
    Rejected { channel: Channel, message: String },

    /// A channel name that is not one of the three integrated backends.
    #[error("unsupported channel `{0}`")]
    UnsupportedChannel(String),

    /// The channel has no backend endpoint for this operation.
    #[error("{channel} does not support {operation}")]
    Unsupported {
        channel: Channel,
        operation: &'static str,
    },

    /// The conversation is not present in the current notification list.
    #[error("{channel} conversation `{id}` not found")]
    ConversationNotFound { channel: Channel, id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl UniboxError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Returns true for failures that leave prior state untouched and are expected
    /// to clear on their own (network drops, unparsable batches).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::MalformedPayload { .. })
    }
}
