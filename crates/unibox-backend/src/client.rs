// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the messaging backend's request/response routes.
//!
//! Provides [`HttpBackend`], the [`ChannelBackend`] implementation used by the
//! CLI and the unread engine.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use unibox_config::model::BackendConfig;
use unibox_core::{
    Channel, ChannelBackend, ConversationCounter, OutboundMessage, ThreadMessage, UniboxError,
};

use crate::types::{
    EmailConversation, FacebookMessage, GraphConversation, ReplyEmailRequest, WhatsAppConversation,
    WhatsAppMessage, WhatsAppSendRequest,
};

/// Shown when the backend rejects a chat send without a body.
const DEFAULT_REJECTION: &str = "Bad Request: Please check your input.";

/// Request/response client for all three channels of one backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Builds a client for `config.base_url` with the configured request timeout.
    pub fn new(config: &BackendConfig) -> Result<Self, UniboxError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            UniboxError::Config(format!("invalid backend.base_url `{}`: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(UniboxError::Config(format!(
                "backend.base_url `{}` cannot be used as a base URL",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| UniboxError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        channel: Channel,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, UniboxError> {
        let response = request.send().await.map_err(|e| UniboxError::Transport {
            channel,
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        })?;
        let status = response.status();
        debug!(channel = %channel, status = %status, url = %response.url(), "backend response received");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if channel == Channel::Chat && status == StatusCode::BAD_REQUEST {
            let message = if body.trim().is_empty() {
                DEFAULT_REJECTION.to_string()
            } else {
                body
            };
            return Err(UniboxError::Rejected { channel, message });
        }
        Err(UniboxError::Transport {
            channel,
            message: format!("backend returned {status}: {body}"),
            source: None,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        channel: Channel,
        segments: &[&str],
    ) -> Result<T, UniboxError> {
        let request = self.client.get(self.endpoint(segments));
        let response = self.send(channel, request).await?;
        let body = response.text().await.map_err(|e| UniboxError::Transport {
            channel,
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| UniboxError::MalformedPayload {
            channel,
            message: format!("failed to parse response: {e}"),
        })
    }

    async fn email_conversations(&self) -> Result<Vec<EmailConversation>, UniboxError> {
        self.get_json(Channel::Email, &["fetch-emails"]).await
    }
}

#[async_trait]
impl ChannelBackend for HttpBackend {
    async fn fetch_conversations(
        &self,
        channel: Channel,
    ) -> Result<Vec<ConversationCounter>, UniboxError> {
        let counters = match channel {
            Channel::SocialNetwork => self
                .get_json::<Vec<GraphConversation>>(channel, &["conversations"])
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
            Channel::Chat => self
                .get_json::<Vec<WhatsAppConversation>>(channel, &["whatsapp", "conversations"])
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
            Channel::Email => self
                .email_conversations()
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        };
        Ok(counters)
    }

    async fn fetch_messages(
        &self,
        channel: Channel,
        conversation_id: &str,
    ) -> Result<Vec<ThreadMessage>, UniboxError> {
        let messages = match channel {
            Channel::SocialNetwork => self
                .get_json::<Vec<FacebookMessage>>(channel, &["conversation", conversation_id])
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
            Channel::Chat => self
                .get_json::<Vec<WhatsAppMessage>>(channel, &["whatsapp", "messages", conversation_id])
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
            Channel::Email => self
                .email_conversations()
                .await?
                .into_iter()
                .find(|conv| conv.conversation_id == conversation_id)
                .ok_or_else(|| UniboxError::ConversationNotFound {
                    channel,
                    id: conversation_id.to_string(),
                })?
                .emails
                .into_iter()
                .map(Into::into)
                .collect(),
        };
        Ok(messages)
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<(), UniboxError> {
        let channel = message.channel;
        let request = match channel {
            Channel::SocialNetwork => {
                let mut url = self.endpoint(&["sendMessage", &message.recipient]);
                url.query_pairs_mut().append_pair("messageText", &message.text);
                self.client.request(Method::POST, url)
            }
            Channel::Chat => self
                .client
                .post(self.endpoint(&["whatsapp", "sendMessage", &message.recipient]))
                .json(&WhatsAppSendRequest {
                    message_text: &message.text,
                }),
            Channel::Email => self
                .client
                .post(self.endpoint(&["reply-email"]))
                .json(&ReplyEmailRequest {
                    recipient: &message.recipient,
                    subject: message.subject.as_deref().unwrap_or_default(),
                    message: &message.text,
                    message_id: message.reply_to.as_deref(),
                }),
        };
        self.send(channel, request).await?;
        debug!(channel = %channel, recipient = %message.recipient, "message sent");
        Ok(())
    }

    async fn mark_read(&self, channel: Channel, conversation_id: &str) -> Result<(), UniboxError> {
        let url = match channel {
            Channel::SocialNetwork => {
                return Err(UniboxError::Unsupported {
                    channel,
                    operation: "mark_read",
                });
            }
            Channel::Chat => self.endpoint(&["whatsapp", "mark-as-read", conversation_id]),
            Channel::Email => self.endpoint(&["mark-as-read", conversation_id]),
        };
        self.send(channel, self.client.put(url)).await?;
        Ok(())
    }

    async fn fetch_unread_count(&self, channel: Channel) -> Result<u64, UniboxError> {
        if channel != Channel::Chat {
            return Err(UniboxError::Unsupported {
                channel,
                operation: "fetch_unread_count",
            });
        }
        let unread: Vec<serde_json::Value> = self
            .get_json(channel, &["whatsapp", "unread-messages"])
            .await?;
        Ok(unread.len() as u64)
    }
}
