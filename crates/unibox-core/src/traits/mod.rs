// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the unread engine.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility, so the
//! engine can hold `Arc<dyn ...>` handles to SQLite, HTTP, or mock
//! implementations interchangeably.

pub mod backend;
pub mod feed;
pub mod store;

pub use backend::ChannelBackend;
pub use feed::{BatchStream, NotificationFeed};
pub use store::ReadStateStore;
