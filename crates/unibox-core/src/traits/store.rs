// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local read-state persistence (last acknowledged counter per conversation).

use async_trait::async_trait;

use crate::error::UniboxError;
use crate::types::{Baseline, Channel, ReadStateKey};

/// Key-value store mapping a conversation to its last acknowledged counter.
///
/// Implementations must survive process restarts (except explicitly
/// ephemeral ones used for tests). Entries are created on first
/// acknowledgement, overwritten on every later one, and never expire.
#[async_trait]
pub trait ReadStateStore: Send + Sync + 'static {
    /// Returns the stored baseline, or `None` if the conversation was never acknowledged.
    async fn get(&self, key: &ReadStateKey) -> Result<Option<Baseline>, UniboxError>;

    /// Stores (or overwrites) the baseline for a conversation.
    async fn set(&self, key: &ReadStateKey, baseline: Baseline) -> Result<(), UniboxError>;

    /// Lists every stored baseline for a channel as `(conversation_id, baseline)`.
    async fn list(&self, channel: Channel) -> Result<Vec<(String, Baseline)>, UniboxError>;
}
