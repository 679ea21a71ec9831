//! JSON envelopes posted to the webhook.
//!
//! Every request body is a flat object: a `timestamp`, a `type` tag and the
//! fields of that type, in camelCase.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::identity::{AnonymousIdentity, SessionId, UserId};
use crate::chat::{Chat, ChatId, FileMetadata};

/// Reply used when the webhook answered 2xx without a usable text.
pub const DEFAULT_BOT_REPLY: &str = "Merci pour votre message. Je traite votre demande.";
/// Reply shown when the webhook could not be reached or failed.
pub const FALLBACK_BOT_REPLY: &str =
    "Désolé, je rencontre des difficultés techniques. Veuillez réessayer.";

/// One outgoing event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebhookEvent {
    /// Text typed by the user.
    #[serde(rename_all = "camelCase")]
    UserMessage {
        /// The text.
        message: String,
        /// Chat the text belongs to.
        chat_id: ChatId,
        /// Anonymous user id.
        user_id: UserId,
        /// Browser-session id.
        session_id: SessionId,
    },
    /// Metadata of a file picked in the composer.
    #[serde(rename_all = "camelCase")]
    FileUpload {
        /// Chat the file was attached to.
        chat_id: ChatId,
        /// File name.
        file_name: String,
        /// Size in bytes.
        file_size: u64,
        /// MIME type.
        file_type: String,
        /// Anonymous user id.
        user_id: UserId,
    },
    /// A chat was created.
    #[serde(rename_all = "camelCase")]
    NewChat {
        /// The new chat.
        chat_id: ChatId,
        /// Its title.
        title: String,
        /// Anonymous user id.
        user_id: UserId,
    },
    /// Connectivity ping.
    #[serde(rename_all = "camelCase")]
    ConnectionTest {
        /// Anonymous user id.
        user_id: UserId,
    },
}

impl WebhookEvent {
    /// A user text message.
    #[must_use]
    pub fn user_message(
        message: impl Into<String>,
        chat_id: ChatId,
        identity: &AnonymousIdentity,
    ) -> Self {
        Self::UserMessage {
            message: message.into(),
            chat_id,
            user_id: identity.user_id.clone(),
            session_id: identity.session_id.clone(),
        }
    }

    /// File metadata for a chat.
    #[must_use]
    pub fn file_upload(file: &FileMetadata, chat_id: ChatId, identity: &AnonymousIdentity) -> Self {
        Self::FileUpload {
            chat_id,
            file_name: file.name.clone(),
            file_size: file.size,
            file_type: file.mime_type.clone(),
            user_id: identity.user_id.clone(),
        }
    }

    /// Notification of a new chat.
    #[must_use]
    pub fn new_chat(chat: &Chat, identity: &AnonymousIdentity) -> Self {
        Self::NewChat {
            chat_id: chat.id,
            title: chat.title.clone(),
            user_id: identity.user_id.clone(),
        }
    }

    /// Connectivity ping.
    #[must_use]
    pub fn connection_test(identity: &AnonymousIdentity) -> Self {
        Self::ConnectionTest {
            user_id: identity.user_id.clone(),
        }
    }

    /// Wire name of the event type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UserMessage { .. } => "user_message",
            Self::FileUpload { .. } => "file_upload",
            Self::NewChat { .. } => "new_chat",
            Self::ConnectionTest { .. } => "connection_test",
        }
    }
}

/// Request body: the event plus its timestamp.
#[derive(Clone, Debug, Serialize)]
pub struct WebhookEnvelope<'a> {
    /// ISO-8601 UTC, millisecond precision.
    pub timestamp: String,
    /// The event fields, flattened next to the timestamp.
    #[serde(flatten)]
    pub event: &'a WebhookEvent,
}

impl<'a> WebhookEnvelope<'a> {
    /// Stamp an event with a time.
    #[must_use]
    pub fn new(event: &'a WebhookEvent, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        }
    }
}

/// Outcome of a user message round trip. Always carries a text to display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotReply {
    /// Whether the webhook answered successfully.
    pub success: bool,
    /// Text to show as the bot's message.
    pub bot_message: String,
    /// Failure description when `success` is false.
    pub error: Option<String>,
    /// Raw webhook body on success.
    pub data: Option<Value>,
}

impl BotReply {
    /// Build a successful reply from the webhook body.
    #[must_use]
    pub fn from_body(body: Value) -> Self {
        Self {
            success: true,
            bot_message: extract_reply_text(&body).unwrap_or(DEFAULT_BOT_REPLY).to_string(),
            error: None,
            data: Some(body),
        }
    }

    /// Build a failed reply carrying the fallback text.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            bot_message: FALLBACK_BOT_REPLY.to_string(),
            error: Some(error.into()),
            data: None,
        }
    }
}

/// `message`, else `response`, when it is a non-empty string.
#[must_use]
pub fn extract_reply_text(body: &Value) -> Option<&str> {
    ["message", "response"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
}
