// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-initiated notification feed for a single channel.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::UniboxError;
use crate::types::{Channel, SnapshotBatch};

/// Stream of full-snapshot batches delivered by a feed.
///
/// An `Err` item reports a transport failure or an undecodable batch; the
/// stream may continue afterwards. The stream ending means the feed closed.
pub type BatchStream = Pin<Box<dyn Stream<Item = Result<SnapshotBatch, UniboxError>> + Send>>;

/// A long-lived push feed of conversation counters for one channel.
///
/// Every delivered batch is the complete current list for the channel, never
/// a diff. Reconnect and backoff are left to the transport.
#[async_trait]
pub trait NotificationFeed: Send + Sync + 'static {
    /// The channel whose counters this feed reports.
    fn channel(&self) -> Channel;

    /// Opens the feed and returns its batch stream.
    async fn connect(&self) -> Result<BatchStream, UniboxError>;
}

