// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unread reconciliation for the Unibox unified inbox.
//!
//! [`UnreadEngine`] merges notification feeds from three messaging channels
//! into per-channel unread totals and a combined total, each channel counted
//! by its own rule:
//!
//! - SocialNetwork reports cumulative message counts, so the last acknowledged
//!   counter (kept in a [`ReadStateStore`](unibox_core::ReadStateStore)) is
//!   subtracted.
//! - Chat and Email report unread counts directly.
//!
//! Every change publishes a complete [`UnreadSnapshot`](unibox_core::UnreadSnapshot)
//! through [`UnreadPublisher`].

pub mod engine;
pub mod feeds;
pub mod publisher;
mod reconcile;
pub mod shutdown;
mod state;

pub use engine::{EngineOptions, UnreadEngine};
pub use feeds::{FeedSet, FeedSubscription};
pub use publisher::{UnreadPublisher, UnreadWatcher};
