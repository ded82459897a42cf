// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `unibox watch` command implementation.
//!
//! Opens the read-state store, subscribes every enabled channel feed, and
//! prints the unread totals whenever the engine publishes a change. Runs
//! until SIGINT/SIGTERM, then unsubscribes all feeds and shuts down.

use tracing::{info, warn};

use unibox_backend::SseFeed;
use unibox_config::model::UniboxConfig;
use unibox_core::{NotificationFeed, UniboxError, UnreadSnapshot};
use unibox_unread::FeedSet;
use unibox_unread::shutdown;

use crate::app::App;
use crate::status::format_totals;

/// Runs the `unibox watch` command.
pub async fn run_watch(config: &UniboxConfig, ephemeral: bool) -> Result<(), UniboxError> {
    info!("starting unibox watch");

    let feeds = SseFeed::from_config(config)?;
    let app = App::open(config, ephemeral).await?;

    if feeds.is_empty() {
        warn!("no notification feeds enabled; nothing to watch");
        return app.close().await;
    }

    let mut watcher = app.engine.watch();
    let mut subscriptions = FeedSet::new();
    for feed in feeds {
        info!(channel = %feed.channel(), url = %feed.url(), "subscribing feed");
        subscriptions.push(app.engine.subscribe(feed));
    }
    info!(channels = ?subscriptions.channels(), "watching for unread changes");

    let cancel = shutdown::install_signal_handler();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = watcher.changed() => match changed {
                Some(snapshot) => print_change(&snapshot),
                None => break,
            }
        }
    }

    subscriptions.unsubscribe_all();
    app.engine.shutdown();
    subscriptions.shutdown().await;
    app.close().await?;

    info!("unibox watch shutdown complete");
    Ok(())
}

fn print_change(snapshot: &UnreadSnapshot) {
    let now = chrono::Local::now().format("%H:%M:%S");
    println!("[{now}] {}", format_totals(snapshot));
}
