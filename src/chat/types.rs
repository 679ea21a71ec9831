//! Conversation types shown in the sidebar and the message list.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::format::format_time;
use super::ids::{ChatId, MessageId};

/// Title given to chats created from the "new chat" action.
pub const NEW_CHAT_TITLE: &str = "Nouvelle Conversation";
/// Preview shown for a chat that has no messages yet.
pub const NEW_CHAT_PREVIEW: &str = "Commencer une nouvelle conversation...";

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing in the browser.
    User,
    /// The reply relayed from the webhook (or a local fallback).
    Bot,
}

impl Sender {
    /// Lowercase label used in markup and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// Metadata of a file picked in the composer. The content never leaves the browser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// File name as reported by the browser.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, empty when the browser could not tell.
    pub mime_type: String,
}

/// Message payload: plain text or a file reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    /// Text typed by the user or returned by the bot.
    Text {
        /// The text itself.
        content: String,
    },
    /// A file reference, rendered as its name.
    File(FileMetadata),
}

/// One turn in a chat. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Author kind.
    pub sender: Sender,
    /// Text or file reference.
    pub body: MessageBody,
    /// Display time (`HH:MM`).
    pub timestamp: String,
    /// Set on locally fabricated failure replies.
    #[serde(default)]
    pub is_error: bool,
    /// Set on bot replies that actually came back from the webhook.
    #[serde(default)]
    pub delivered_via_webhook: bool,
}

impl Message {
    /// A text message typed by the user.
    #[must_use]
    pub fn user_text(content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::build(
            Sender::User,
            MessageBody::Text {
                content: content.into(),
            },
            now,
        )
    }

    /// A file reference sent by the user.
    #[must_use]
    pub fn user_file(file: FileMetadata, now: DateTime<Utc>) -> Self {
        Self::build(Sender::User, MessageBody::File(file), now)
    }

    /// A bot reply. `delivered` marks replies that came from the webhook,
    /// `is_error` marks locally fabricated fallbacks.
    #[must_use]
    pub fn bot_reply(
        content: impl Into<String>,
        delivered: bool,
        is_error: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let mut message = Self::build(
            Sender::Bot,
            MessageBody::Text {
                content: content.into(),
            },
            now,
        );
        message.delivered_via_webhook = delivered;
        message.is_error = is_error;
        message
    }

    fn build(sender: Sender, body: MessageBody, now: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            body,
            timestamp: format_time(&now.with_timezone(&Local)),
            is_error: false,
            delivered_via_webhook: false,
        }
    }

    /// Text shown for the message; file references show a paperclip and the name.
    #[must_use]
    pub fn display_text(&self) -> String {
        match &self.body {
            MessageBody::Text { content } => content.clone(),
            MessageBody::File(file) => format!("📎 {}", file.name),
        }
    }

    /// File reference, if this message carries one.
    #[must_use]
    pub const fn file(&self) -> Option<&FileMetadata> {
        match &self.body {
            MessageBody::File(file) => Some(file),
            MessageBody::Text { .. } => None,
        }
    }
}

/// A conversation thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Chat identifier.
    pub id: ChatId,
    /// Display title.
    pub title: String,
    /// Preview of the latest activity shown in the sidebar.
    pub last_message: String,
    /// Last-activity timestamp.
    pub timestamp: DateTime<Utc>,
    messages: Vec<Message>,
}

impl Chat {
    /// Build a chat from existing parts.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        last_message: impl Into<String>,
        timestamp: DateTime<Utc>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            id: ChatId::new(),
            title: title.into(),
            last_message: last_message.into(),
            timestamp,
            messages,
        }
    }

    /// The empty chat created by the "new chat" action.
    #[must_use]
    pub fn new_conversation(now: DateTime<Utc>) -> Self {
        Self::new(NEW_CHAT_TITLE, NEW_CHAT_PREVIEW, now, Vec::new())
    }

    /// Messages in append order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message. History is append-only.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}
