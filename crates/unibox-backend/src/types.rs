// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the messaging backend's REST routes and SSE payloads.
//!
//! Decoding is lenient: unknown fields are ignored and most fields default,
//! since the backend forwards third-party objects it does not control.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unibox_core::{Channel, ConversationCounter, SnapshotBatch, ThreadMessage, UniboxError};

/// Timestamps arrive as epoch milliseconds or RFC 3339 strings.
mod flexible_date {
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Millis(i64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawDate>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawDate::Millis(ms)) => DateTime::from_timestamp_millis(ms)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp {ms} out of range"))),
            Some(RawDate::Text(text)) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(D::Error::custom),
        }
    }
}

// --- SocialNetwork (Facebook) ---

/// A conversation as pushed on the `facebookConversations` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookConversation {
    pub id: String,
    #[serde(default)]
    pub participant_name: Option<String>,
    #[serde(default, with = "flexible_date")]
    pub updated_time: Option<DateTime<Utc>>,
    /// Cumulative count of messages sent by the other participant.
    #[serde(default)]
    pub messages_from_primary_participant: u64,
    #[serde(default)]
    pub messages: Vec<FacebookMessage>,
}

impl From<FacebookConversation> for ConversationCounter {
    fn from(conv: FacebookConversation) -> Self {
        ConversationCounter {
            conversation_id: conv.id,
            counter: conv.messages_from_primary_participant,
            participant: conv.participant_name,
            last_activity: conv.updated_time,
        }
    }
}

/// A Graph conversation object as returned by `GET /conversations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConversation {
    pub id: String,
    #[serde(default)]
    pub participants: Vec<FacebookProfile>,
    #[serde(default, with = "flexible_date")]
    pub updated_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<FacebookMessage>,
}

impl From<GraphConversation> for ConversationCounter {
    /// The first participant is the other party; its message count is the
    /// same cumulative counter the feed reports.
    fn from(conv: GraphConversation) -> Self {
        let primary = conv.participants.first();
        let counter = primary
            .and_then(|p| p.id.as_deref())
            .map(|primary_id| {
                conv.messages
                    .iter()
                    .filter(|m| m.from.as_ref().and_then(FacebookSender::id) == Some(primary_id))
                    .count() as u64
            })
            .unwrap_or(0);
        ConversationCounter {
            conversation_id: conv.id,
            counter,
            participant: primary.and_then(|p| p.name.clone()),
            last_activity: conv.updated_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Feed payloads carry the sender's display name, Graph objects a profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FacebookSender {
    Name(String),
    Profile(FacebookProfile),
}

impl FacebookSender {
    fn id(&self) -> Option<&str> {
        match self {
            FacebookSender::Name(_) => None,
            FacebookSender::Profile(p) => p.id.as_deref(),
        }
    }

    fn display_name(&self) -> Option<&str> {
        match self {
            FacebookSender::Name(name) => Some(name),
            FacebookSender::Profile(p) => p.name.as_deref().or(p.id.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub from: Option<FacebookSender>,
    #[serde(default, with = "flexible_date")]
    pub created_time: Option<DateTime<Utc>>,
}

impl From<FacebookMessage> for ThreadMessage {
    fn from(msg: FacebookMessage) -> Self {
        ThreadMessage {
            sender: msg
                .from
                .as_ref()
                .and_then(FacebookSender::display_name)
                .unwrap_or("Unknown")
                .to_string(),
            id: msg.id,
            body: msg.message.unwrap_or_default(),
            sent_at: msg.created_time,
        }
    }
}

// --- Chat (WhatsApp) ---

/// A chat conversation keyed by the sender's phone number.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppConversation {
    pub sender: String,
    #[serde(default, with = "flexible_date")]
    pub last_message_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_count: u64,
}

impl From<WhatsAppConversation> for ConversationCounter {
    fn from(conv: WhatsAppConversation) -> Self {
        ConversationCounter {
            participant: Some(conv.sender.clone()),
            conversation_id: conv.sender,
            counter: conv.unread_count,
            last_activity: conv.last_message_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppMessage {
    #[serde(default)]
    pub id: Option<i64>,
    pub sender: String,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default, with = "flexible_date")]
    pub sent_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread: bool,
}

impl From<WhatsAppMessage> for ThreadMessage {
    fn from(msg: WhatsAppMessage) -> Self {
        ThreadMessage {
            id: msg.message_id.or_else(|| msg.id.map(|id| id.to_string())),
            sender: msg.sender,
            body: msg.message,
            sent_at: msg.sent_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppSendRequest<'a> {
    pub message_text: &'a str,
}

// --- Email ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConversation {
    pub conversation_id: String,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub emails: Vec<ReceivedEmail>,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default, with = "flexible_date")]
    pub last_email_date: Option<DateTime<Utc>>,
}

impl From<EmailConversation> for ConversationCounter {
    fn from(conv: EmailConversation) -> Self {
        ConversationCounter {
            conversation_id: conv.conversation_id,
            counter: conv.unread_count,
            participant: conv.sender,
            last_activity: conv.last_email_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedEmail {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub in_reply_to: Option<String>,
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default, with = "flexible_date")]
    pub sent_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<String>,
}

impl From<ReceivedEmail> for ThreadMessage {
    fn from(email: ReceivedEmail) -> Self {
        let body = match (email.subject, email.body) {
            (Some(subject), Some(body)) if !subject.is_empty() => format!("{subject}\n\n{body}"),
            (_, Some(body)) => body,
            (Some(subject), None) => subject,
            (None, None) => String::new(),
        };
        ThreadMessage {
            id: email.message_id,
            sender: email.from.unwrap_or_else(|| "Unknown".to_string()),
            body,
            sent_at: email.sent_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEmailRequest<'a> {
    pub recipient: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<&'a str>,
}

// --- Feed payload decoding ---

fn decode_list<T>(channel: Channel, data: &str) -> Result<Vec<ConversationCounter>, UniboxError>
where
    T: serde::de::DeserializeOwned + Into<ConversationCounter>,
{
    serde_json::from_str::<Vec<T>>(data)
        .map(|items| items.into_iter().map(Into::into).collect())
        .map_err(|e| UniboxError::MalformedPayload {
            channel,
            message: e.to_string(),
        })
}

/// Decodes one SSE data payload (a JSON array of conversations) into a batch.
pub fn decode_batch(channel: Channel, data: &str) -> Result<SnapshotBatch, UniboxError> {
    let counters = match channel {
        Channel::SocialNetwork => decode_list::<FacebookConversation>(channel, data)?,
        Channel::Chat => decode_list::<WhatsAppConversation>(channel, data)?,
        Channel::Email => decode_list::<EmailConversation>(channel, data)?,
    };
    Ok(SnapshotBatch::new(channel, counters))
}
