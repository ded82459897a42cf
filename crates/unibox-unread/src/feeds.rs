// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feed supervision: one background task per subscribed channel feed.
//!
//! Each task forwards batches to the engine until the feed ends or the
//! subscription is cancelled. Errors are logged and the previous state kept;
//! there is no reconnect.

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use unibox_core::{Channel, NotificationFeed};

use crate::engine::UnreadEngine;

/// Handle to a running feed task. Dropping it unsubscribes.
#[derive(Debug)]
pub struct FeedSubscription {
    channel: Channel,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl FeedSubscription {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Stops forwarding batches. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if !self.token.is_cancelled() {
            debug!(channel = %self.channel, "unsubscribing feed");
            self.token.cancel();
        }
    }

    /// True until the feed ends, fails to connect, or is unsubscribed.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Waits for the feed task to exit.
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(channel = %self.channel, error = %e, "feed task panicked");
            }
        }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// The subscriptions of one watch session, torn down together.
#[derive(Debug, Default)]
pub struct FeedSet {
    subscriptions: Vec<FeedSubscription>,
}

impl FeedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: FeedSubscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.subscriptions.iter().map(FeedSubscription::channel).collect()
    }

    pub fn unsubscribe_all(&self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
    }

    /// Unsubscribes everything and waits for the tasks to exit.
    pub async fn shutdown(self) {
        self.unsubscribe_all();
        for subscription in self.subscriptions {
            subscription.join().await;
        }
    }
}

impl UnreadEngine {
    /// Starts forwarding `feed`'s batches into the engine.
    ///
    /// The subscription is also cancelled by [`UnreadEngine::shutdown`].
    pub fn subscribe<F: NotificationFeed>(&self, feed: F) -> FeedSubscription {
        let channel = feed.channel();
        let token = self.shutdown_token().child_token();
        let handle = tokio::spawn(run_feed(self.clone(), feed, token.clone()));
        FeedSubscription {
            channel,
            token,
            handle: Some(handle),
        }
    }
}

async fn run_feed<F: NotificationFeed>(engine: UnreadEngine, feed: F, token: CancellationToken) {
    let channel = feed.channel();

    let connected = tokio::select! {
        _ = token.cancelled() => return,
        result = feed.connect() => result,
    };
    let mut stream = match connected {
        Ok(stream) => stream,
        Err(e) => {
            warn!(channel = %channel, error = %e, "feed connection failed");
            token.cancel();
            return;
        }
    };

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!(channel = %channel, "feed unsubscribed");
                break;
            }
            item = stream.next() => match item {
                Some(Ok(batch)) if batch.channel != channel => {
                    warn!(channel = %channel, batch_channel = %batch.channel, "feed delivered a batch for another channel; skipped");
                }
                Some(Ok(batch)) => {
                    if let Err(e) = engine.apply_batch(batch).await {
                        warn!(channel = %channel, error = %e, "batch discarded; keeping previous state");
                    }
                }
                Some(Err(e)) => {
                    warn!(channel = %channel, error = %e, "feed error; keeping previous state");
                }
                None => {
                    info!(channel = %channel, "feed ended");
                    token.cancel();
                    break;
                }
            }
        }
    }
}
