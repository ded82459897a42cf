// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-sent event notification feeds, one per channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::info;

use unibox_config::UniboxConfig;
use unibox_config::model::FeedConfig;
use unibox_core::{BatchStream, Channel, NotificationFeed, UniboxError};

use crate::sse::parse_feed_stream;

/// A channel's long-lived SSE endpoint.
///
/// The request timeout does not apply here: a feed stays open until the
/// server ends it or the subscriber drops it.
#[derive(Debug, Clone)]
pub struct SseFeed {
    client: reqwest::Client,
    channel: Channel,
    url: String,
    event: String,
}

impl SseFeed {
    pub fn new(channel: Channel, base_url: &str, feed: &FeedConfig) -> Result<Self, UniboxError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| UniboxError::Internal(format!("failed to build feed client: {e}")))?;
        Ok(Self {
            client,
            channel,
            url: format!("{}{}", base_url.trim_end_matches('/'), feed.path),
            event: feed.event.clone(),
        })
    }

    /// Feeds for every channel enabled in the configuration.
    pub fn from_config(config: &UniboxConfig) -> Result<Vec<Self>, UniboxError> {
        Channel::ALL
            .into_iter()
            .filter(|channel| config.feeds.for_channel(*channel).enabled)
            .map(|channel| {
                Self::new(
                    channel,
                    &config.backend.base_url,
                    config.feeds.for_channel(channel),
                )
            })
            .collect()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationFeed for SseFeed {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn connect(&self) -> Result<BatchStream, UniboxError> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .send()
            .await
            .map_err(|e| UniboxError::Transport {
                channel: self.channel,
                message: format!("failed to open feed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UniboxError::Transport {
                channel: self.channel,
                message: format!("feed endpoint returned {status}"),
                source: None,
            });
        }

        info!(channel = %self.channel, url = %self.url, "notification feed connected");
        Ok(parse_feed_stream(response, self.channel, self.event.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_feed_config() -> FeedConfig {
        FeedConfig {
            enabled: true,
            path: "/whatsapp/notifications".into(),
            event: "whatsappConversations".into(),
        }
    }

    #[test]
    fn from_config_skips_disabled_feeds() {
        let mut config = UniboxConfig::default();
        config.feeds.email.enabled = false;
        let feeds = SseFeed::from_config(&config).unwrap();
        let channels: Vec<_> = feeds.iter().map(|f| f.channel()).collect();
        assert_eq!(channels, vec![Channel::SocialNetwork, Channel::Chat]);
        assert_eq!(feeds[1].url(), "http://localhost:8080/whatsapp/notifications");
    }

    #[tokio::test]
    async fn connect_streams_batches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/whatsapp/notifications"))
            .and(header("accept", "text/event-stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(
                        "event: whatsappConversations\ndata: [{\"sender\":\"1\",\"unreadCount\":5}]\n\n",
                    ),
            )
            .mount(&server)
            .await;

        let feed = SseFeed::new(Channel::Chat, &server.uri(), &chat_feed_config()).unwrap();
        let mut stream = feed.connect().await.unwrap();
        let batch = stream.next().await.unwrap().unwrap();
        assert_eq!(batch.raw_sum(), 5);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn connect_fails_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let feed = SseFeed::new(Channel::Chat, &server.uri(), &chat_feed_config()).unwrap();
        let err = feed.connect().await.err().unwrap();
        assert!(err.is_transient());
    }
}
