// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `unibox status` command implementation.
//!
//! Lists every channel's conversations once, reconciles them through the
//! engine exactly as feed batches would be, and prints the unread totals.
//! Channels whose backend is unreachable are reported, not fatal.

use std::io::IsTerminal;

use serde::Serialize;

use unibox_config::model::UniboxConfig;
use unibox_core::{Channel, UniboxError, UnreadCounts, UnreadSnapshot};

use crate::app::App;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub social_network: u64,
    pub chat: u64,
    pub email: u64,
    pub combined: u64,
    pub unavailable: Vec<Channel>,
    /// Conversations with a stored read baseline, per channel.
    pub acknowledged: UnreadCounts,
}

impl StatusResponse {
    pub fn new(
        snapshot: &UnreadSnapshot,
        unavailable: Vec<Channel>,
        acknowledged: UnreadCounts,
    ) -> Self {
        let counts = snapshot.per_channel();
        Self {
            social_network: counts.social_network,
            chat: counts.chat,
            email: counts.email,
            combined: snapshot.combined(),
            unavailable,
            acknowledged,
        }
    }
}

/// One-line summary used by `watch` for every published change.
pub fn format_totals(snapshot: &UnreadSnapshot) -> String {
    let counts = snapshot.per_channel();
    format!(
        "all={} social_network={} chat={} email={}",
        snapshot.combined(),
        counts.social_network,
        counts.chat,
        counts.email
    )
}

/// Run the `unibox status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(config: &UniboxConfig, json: bool, plain: bool) -> Result<(), UniboxError> {
    let app = App::open(config, false).await?;
    let (snapshot, unavailable) = app.refresh_all().await;
    let acknowledged = app.acknowledged().await?;

    if json {
        let response = StatusResponse::new(&snapshot, unavailable, acknowledged);
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&snapshot, &unavailable, acknowledged, use_color);
    }

    app.close().await
}

fn print_status(
    snapshot: &UnreadSnapshot,
    unavailable: &[Channel],
    acknowledged: UnreadCounts,
    use_color: bool,
) {
    println!();
    println!("  unibox status");
    println!("  {}", "-".repeat(35));

    for channel in Channel::ALL {
        let label = format!("{channel}:");
        let total = snapshot.channel_total(channel);
        if unavailable.contains(&channel) {
            if use_color {
                use colored::Colorize;
                println!("    {label:<16}{} {}", "✗".red(), "unavailable".red());
            } else {
                println!("    {label:<16}[FAIL] unavailable");
            }
        } else if use_color {
            use colored::Colorize;
            let count = if total > 0 {
                total.to_string().yellow().bold()
            } else {
                total.to_string().green()
            };
            println!("    {label:<16}{count}");
        } else {
            println!("    {label:<16}{total}");
        }
    }

    println!("  {}", "-".repeat(35));
    if use_color {
        use colored::Colorize;
        println!("    {:<16}{}", "all:", snapshot.combined().to_string().bold());
    } else {
        println!("    {:<16}{}", "all:", snapshot.combined());
    }
    println!("    {:<16}{}", "read baselines:", acknowledged.sum());
    println!();
}
