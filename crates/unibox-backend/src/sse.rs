// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for channel notification feeds.
//!
//! Converts a reqwest response byte stream into [`SnapshotBatch`]es using the
//! `eventsource-stream` crate for SSE protocol compliance.

use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use tracing::debug;

use unibox_core::{BatchStream, Channel, UniboxError};

use crate::types::decode_batch;

/// Parses a streaming feed response into a stream of snapshot batches.
///
/// Only events named `event_name` carry batches; everything else (keep-alives,
/// other event names) is skipped. Undecodable data yields
/// [`UniboxError::MalformedPayload`] and the stream continues.
pub fn parse_feed_stream(
    response: reqwest::Response,
    channel: Channel,
    event_name: impl Into<String>,
) -> BatchStream {
    let event_name = event_name.into();
    let events = response.bytes_stream().eventsource();

    let mapped = events.filter_map(move |result| {
        let item = match result {
            Ok(event) if event.event == event_name => Some(decode_batch(channel, &event.data)),
            Ok(event) => {
                debug!(channel = %channel, event = %event.event, "skipping unrelated feed event");
                None
            }
            Err(e) => Some(Err(UniboxError::Transport {
                channel,
                message: format!("feed stream error: {e}"),
                source: None,
            })),
        };
        futures::future::ready(item)
    });

    Box::pin(mapped)
}
