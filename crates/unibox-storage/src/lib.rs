// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-state persistence for Unibox.
//!
//! Stores the last acknowledged server counter per conversation so that
//! SocialNetwork unread counts survive restarts. [`SqliteReadStateStore`] is
//! the durable implementation (WAL-mode SQLite with embedded migrations,
//! single writer via `tokio-rusqlite`); [`MemoryReadStateStore`] backs
//! ephemeral runs and tests.

pub mod adapter;
pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteReadStateStore;
pub use database::Database;
pub use memory::MemoryReadStateStore;
