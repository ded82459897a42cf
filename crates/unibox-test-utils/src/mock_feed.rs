// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notification feed for deterministic testing.
//!
//! `MockFeed` implements `NotificationFeed`; the paired `MockFeedHandle`
//! injects batches and errors into the connected stream and closes it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;
use tokio::sync::{Mutex, mpsc};

use unibox_core::{
    BatchStream, Channel, ConversationCounter, NotificationFeed, SnapshotBatch, UniboxError,
};

type FeedItem = Result<SnapshotBatch, UniboxError>;

/// A feed whose batches are pushed by the test through a [`MockFeedHandle`].
///
/// Only the first `connect()` succeeds; a second one fails, since a real
/// feed stream cannot be shared.
pub struct MockFeed {
    channel: Channel,
    rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<FeedItem>>>>,
    connect_error: Option<String>,
    connects: Arc<AtomicUsize>,
}

/// Sender half of a [`MockFeed`]. Dropping it (or calling [`close`](Self::close)) ends the stream.
#[derive(Clone)]
pub struct MockFeedHandle {
    channel: Channel,
    tx: mpsc::UnboundedSender<FeedItem>,
    connects: Arc<AtomicUsize>,
}

impl MockFeed {
    /// Create a feed for `channel` and the handle that drives it.
    pub fn new(channel: Channel) -> (Self, MockFeedHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connects = Arc::new(AtomicUsize::new(0));
        let feed = Self {
            channel,
            rx: Arc::new(Mutex::new(Some(rx))),
            connect_error: None,
            connects: connects.clone(),
        };
        let handle = MockFeedHandle {
            channel,
            tx,
            connects,
        };
        (feed, handle)
    }

    /// A feed whose `connect()` always fails with a transport error.
    pub fn unreachable(channel: Channel, message: impl Into<String>) -> Self {
        Self {
            channel,
            rx: Arc::new(Mutex::new(None)),
            connect_error: Some(message.into()),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn transport(&self, message: String) -> UniboxError {
        UniboxError::Transport {
            channel: self.channel,
            message,
            source: None,
        }
    }
}

#[async_trait]
impl NotificationFeed for MockFeed {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn connect(&self) -> Result<BatchStream, UniboxError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.connect_error {
            return Err(self.transport(message.clone()));
        }
        let rx = self
            .rx
            .lock()
            .await
            .take()
            .ok_or_else(|| self.transport("mock feed already connected".into()))?;

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }
}

impl MockFeedHandle {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Push a full batch of `(conversation_id, counter)` pairs for the feed's channel.
    ///
    /// Returns false if the feed side is gone.
    pub fn push(&self, counters: &[(&str, u64)]) -> bool {
        let counters = counters
            .iter()
            .map(|(id, counter)| ConversationCounter::new(*id, *counter))
            .collect();
        self.push_batch(SnapshotBatch::new(self.channel, counters))
    }

    /// Push an arbitrary batch, possibly for another channel.
    pub fn push_batch(&self, batch: SnapshotBatch) -> bool {
        self.tx.send(Ok(batch)).is_ok()
    }

    /// Push an error item, as a transport hiccup or undecodable payload would.
    pub fn push_error(&self, error: UniboxError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    /// Push a malformed-payload error for the feed's channel.
    pub fn push_malformed(&self, message: &str) -> bool {
        self.push_error(UniboxError::MalformedPayload {
            channel: self.channel,
            message: message.to_string(),
        })
    }

    /// How many times the feed has been connected.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// True once the subscriber dropped the stream.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// End the stream from the feed side.
    pub fn close(self) {
        drop(self.tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn pushed_items_arrive_in_order() {
        let (feed, handle) = MockFeed::new(Channel::Email);
        let mut stream = feed.connect().await.unwrap();

        assert!(handle.push(&[("e1", 2)]));
        assert!(handle.push_malformed("bad json"));
        handle.close();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.channel, Channel::Email);
        assert_eq!(first.raw_sum(), 2);
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn second_connect_fails() {
        let (feed, handle) = MockFeed::new(Channel::Chat);
        let _stream = feed.connect().await.unwrap();
        assert!(feed.connect().await.is_err());
        assert_eq!(handle.connect_count(), 2);
    }

    #[tokio::test]
    async fn unreachable_feed_reports_transport_error() {
        let feed = MockFeed::unreachable(Channel::SocialNetwork, "connection refused");
        let err = feed.connect().await.err().unwrap();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn handle_sees_dropped_stream() {
        let (feed, handle) = MockFeed::new(Channel::Chat);
        let stream = feed.connect().await.unwrap();
        drop(stream);
        assert!(handle.is_closed());
        assert!(!handle.push(&[("c1", 1)]));
    }
}
