// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP adapters for the Unibox messaging backend.
//!
//! [`HttpBackend`] covers the request/response routes (conversation listings,
//! threads, sending, mark-as-read, unread count) and [`SseFeed`] the
//! per-channel server-sent event feeds that push conversation snapshots.

pub mod client;
pub mod feed;
pub mod sse;
pub mod types;

pub use client::HttpBackend;
pub use feed::SseFeed;
pub use sse::parse_feed_stream;
pub use types::decode_batch;
