// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Unibox integration tests.
//!
//! Provides scriptable stand-ins for the engine's collaborators so tests run
//! without a live backend.
//!
//! # Components
//!
//! - [`MockFeed`] - Notification feed driven through a [`MockFeedHandle`]
//! - [`MockBackend`] - Channel backend with scripted replies, call capture and failure injection
//! - [`FaultyReadStateStore`] - Read-state store whose reads or writes can be made to fail
//! - [`TestHarness`] - An [`UnreadEngine`](unibox_unread::UnreadEngine) wired to all of the above

pub mod faulty_store;
pub mod harness;
pub mod mock_backend;
pub mod mock_feed;

pub use faulty_store::FaultyReadStateStore;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_backend::{BackendCall, MockBackend, MockOperation};
pub use mock_feed::{MockFeed, MockFeedHandle};
