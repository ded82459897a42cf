// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unibox - unified inbox unread counts.
//!
//! This is the binary entry point for the Unibox CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod mark_read;
mod messages;
mod status;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use unibox_config::model::UniboxConfig;
use unibox_core::{Channel, OutboundMessage, UniboxError};

/// Unibox - unread counts across social, chat and email inboxes.
#[derive(Parser, Debug)]
#[command(name = "unibox", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Follow the notification feeds and print unread totals as they change.
    Watch {
        /// Keep read state in memory only.
        #[arg(long)]
        ephemeral: bool,
    },
    /// Fetch every channel once and print unread totals.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Mark a conversation as read.
    MarkRead {
        /// social_network, chat or email.
        channel: String,
        conversation_id: String,
    },
    /// Print the messages of a conversation.
    Messages {
        #[arg(value_parser = parse_channel)]
        channel: Channel,
        conversation_id: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Send a message through a channel.
    Send {
        #[arg(value_parser = parse_channel)]
        channel: Channel,
        /// Page-scoped user id, phone number, or email address.
        recipient: String,
        text: String,
        /// Email subject.
        #[arg(long)]
        subject: Option<String>,
        /// Message-ID of the email being replied to.
        #[arg(long)]
        reply_to: Option<String>,
    },
}

fn parse_channel(value: &str) -> Result<Channel, String> {
    Channel::parse(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let loaded = match &cli.config {
        Some(path) => unibox_config::load_and_validate_path(path),
        None => unibox_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            unibox_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.general.log_level);

    let Some(command) = cli.command else {
        println!("unibox: use --help for available commands");
        return;
    };

    if let Err(e) = run(command, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: UniboxConfig) -> Result<(), UniboxError> {
    match command {
        Commands::Watch { ephemeral } => watch::run_watch(&config, ephemeral).await,
        Commands::Status { json, plain } => status::run_status(&config, json, plain).await,
        Commands::MarkRead {
            channel,
            conversation_id,
        } => mark_read::run_mark_read(&config, &channel, &conversation_id).await,
        Commands::Messages {
            channel,
            conversation_id,
            json,
        } => messages::run_messages(&config, channel, &conversation_id, json).await,
        Commands::Send {
            channel,
            recipient,
            text,
            subject,
            reply_to,
        } => {
            let message = OutboundMessage {
                subject,
                reply_to,
                ..OutboundMessage::new(channel, recipient, text)
            };
            messages::run_send(&config, message).await
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` overrides the configured level. Logs go to stderr so command
/// output on stdout stays clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("unibox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn send_accepts_email_options() {
        let cli = Cli::try_parse_from([
            "unibox",
            "send",
            "email",
            "ana@example.com",
            "Thanks!",
            "--subject",
            "Re: order",
            "--reply-to",
            "<m1@mail>",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Send {
                channel,
                subject,
                reply_to,
                ..
            }) => {
                assert_eq!(channel, Channel::Email);
                assert_eq!(subject.as_deref(), Some("Re: order"));
                assert_eq!(reply_to.as_deref(), Some("<m1@mail>"));
            }
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn messages_rejects_unknown_channel() {
        assert!(Cli::try_parse_from(["unibox", "messages", "sms", "c1"]).is_err());
    }

    #[test]
    fn mark_read_keeps_raw_channel_name() {
        let cli = Cli::try_parse_from(["unibox", "mark-read", "SMS", "x"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::MarkRead { ref channel, .. }) if channel == "SMS"
        ));
    }

    #[test]
    fn global_config_flag_parses_after_subcommand() {
        let cli = Cli::try_parse_from(["unibox", "status", "--config", "/tmp/unibox.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/unibox.toml")));
    }
}
