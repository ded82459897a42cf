// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `unibox mark-read` command implementation.
//!
//! Loads the channel's current conversations, then acknowledges one of them
//! through the engine. Unknown channels and conversations are warnings, not
//! errors.

use tracing::warn;

use unibox_config::model::UniboxConfig;
use unibox_core::{Channel, UniboxError};

use crate::app::App;

/// Runs the `unibox mark-read` command.
pub async fn run_mark_read(
    config: &UniboxConfig,
    channel: &str,
    conversation_id: &str,
) -> Result<(), UniboxError> {
    let app = App::open(config, false).await?;
    let result = mark_read(&app, channel, conversation_id).await;
    app.close().await?;
    result
}

async fn mark_read(app: &App, channel_name: &str, conversation_id: &str) -> Result<(), UniboxError> {
    let Ok(channel) = Channel::parse(channel_name) else {
        // The engine logs and ignores unsupported channels.
        app.engine
            .mark_conversation_read(conversation_id, channel_name)
            .await;
        return Ok(());
    };

    let before = app.refresh(channel).await?;
    if before.notification(channel, conversation_id).is_none() {
        warn!(channel = %channel, conversation_id, "conversation is not in the current list");
    }

    app.engine
        .mark_conversation_read(conversation_id, channel_name)
        .await;

    let after = app.engine.snapshot();
    println!(
        "{channel} unread: {} -> {} (all: {})",
        before.channel_total(channel),
        after.channel_total(channel),
        after.combined()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_config;
    use unibox_core::{Baseline, ReadStateKey, ReadStateStore};
    use unibox_storage::SqliteReadStateStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn social_network_mark_read_persists_baseline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conversations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": "t1",
                "participants": [{"id": "u1", "name": "Ana"}, {"id": "page", "name": "Shop"}],
                "messages": [
                    {"id": "m1", "message": "hi", "from": {"id": "u1", "name": "Ana"}},
                    {"id": "m2", "message": "hello", "from": {"id": "page", "name": "Shop"}},
                    {"id": "m3", "message": "price?", "from": {"id": "u1", "name": "Ana"}}
                ]
            }])))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&server.uri(), &dir.path().join("db.sqlite"));
        run_mark_read(&config, "facebook", "t1").await.unwrap();

        let store = SqliteReadStateStore::open(config.storage).await.unwrap();
        let baseline = store
            .get(&ReadStateKey::new(Channel::SocialNetwork, "t1"))
            .await
            .unwrap();
        assert_eq!(baseline, Some(Baseline::new(2)));
    }

    #[tokio::test]
    async fn unsupported_channel_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config("http://127.0.0.1:9", &dir.path().join("db.sqlite"));
        assert!(run_mark_read(&config, "SMS", "x").await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/whatsapp/conversations"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&server.uri(), &dir.path().join("db.sqlite"));
        let err = run_mark_read(&config, "chat", "15550001").await.unwrap_err();
        assert!(err.is_transient());
    }
}
