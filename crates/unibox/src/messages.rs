// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `unibox messages` and `unibox send` command implementations.
//!
//! Thin wrappers over the backend client; neither touches unread state.

use unibox_backend::HttpBackend;
use unibox_config::model::UniboxConfig;
use unibox_core::{Channel, ChannelBackend, OutboundMessage, ThreadMessage, UniboxError};

/// Runs the `unibox messages` command: prints one conversation thread.
pub async fn run_messages(
    config: &UniboxConfig,
    channel: Channel,
    conversation_id: &str,
    json: bool,
) -> Result<(), UniboxError> {
    let backend = HttpBackend::new(&config.backend)?;
    let messages = backend.fetch_messages(channel, conversation_id).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&messages).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    if messages.is_empty() {
        println!("no messages in {channel} conversation {conversation_id}");
    }
    for message in &messages {
        println!("{}", format_message(message));
    }
    Ok(())
}

/// Runs the `unibox send` command.
pub async fn run_send(config: &UniboxConfig, message: OutboundMessage) -> Result<(), UniboxError> {
    let backend = HttpBackend::new(&config.backend)?;
    backend.send_message(&message).await?;
    println!("sent to {} via {}", message.recipient, message.channel);
    Ok(())
}

fn format_message(message: &ThreadMessage) -> String {
    match message.sent_at {
        Some(at) => format!(
            "[{}] {}: {}",
            at.format("%Y-%m-%d %H:%M"),
            message.sender,
            message.body
        ),
        None => format!("{}: {}", message.sender, message.body),
    }
}
