//! Per-browser UI state and the actions the page can trigger.
//!
//! A [`ChatSession`] holds what the page renders (chat list, selection,
//! typing indicator, sidebar and microphone flags) and the connection hook of
//! that browser session. State locks are never held across a webhook round
//! trip: a second send can start before the first one resolves, and replies
//! land in completion order.

pub mod registry;

pub use registry::SessionRegistry;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::chat::{Chat, ChatId, ChatList, FileMetadata, Message};
use crate::connection::{ConnectionHook, ConnectionStatus};
use crate::webhook::{AnonymousIdentity, BotReply, WebhookClient, WebhookError};

/// Errors returned by session actions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// There is no chat to act on.
    #[error("no chat selected")]
    NoChatSelected,
    /// The referenced chat does not exist in this session.
    #[error("unknown chat: {0}")]
    UnknownChat(ChatId),
    /// The webhook call failed.
    #[error("webhook error: {0}")]
    Webhook(#[from] WebhookError),
    /// The background round trip panicked or the runtime is shutting down.
    #[error("round trip interrupted: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// Convenience result alias for session actions.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result of a send attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was appended and nothing was sent.
    Ignored,
    /// The user message was appended and a bot reply followed.
    Sent(BotReply),
}

#[derive(Debug, Default)]
struct ViewState {
    chats: ChatList,
    pending_replies: usize,
    sidebar_open: bool,
    recording: bool,
}

/// Everything the page needs to render one frame.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    /// Chats in sidebar order.
    pub chats: Vec<Chat>,
    /// Selected chat.
    pub selected: Option<ChatId>,
    /// A reply is pending.
    pub typing: bool,
    /// Mobile sidebar is open.
    pub sidebar_open: bool,
    /// Microphone toggle (display only).
    pub recording: bool,
    /// Connection badge state.
    pub connection: ConnectionStatus,
    /// Identity of this browser session.
    pub identity: AnonymousIdentity,
}

impl SessionSnapshot {
    /// The selected chat.
    #[must_use]
    pub fn selected_chat(&self) -> Option<&Chat> {
        self.selected
            .and_then(|id| self.chats.iter().find(|c| c.id == id))
    }
}

/// UI state of one browser session.
pub struct ChatSession {
    hook: ConnectionHook,
    view: RwLock<ViewState>,
    last_seen_ms: AtomicI64,
}

impl ChatSession {
    /// Create a session over the given chats; the first one starts selected.
    #[must_use]
    pub fn new(client: Arc<WebhookClient>, identity: AnonymousIdentity, chats: Vec<Chat>) -> Self {
        Self {
            hook: ConnectionHook::new(client, identity),
            view: RwLock::new(ViewState {
                chats: ChatList::new(chats),
                ..ViewState::default()
            }),
            last_seen_ms: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    /// Identity stamped on this session's payloads.
    #[must_use]
    pub const fn identity(&self) -> &AnonymousIdentity {
        self.hook.identity()
    }

    /// Run the initial connection test in the background.
    pub fn mount(self: &Arc<Self>) {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            session.hook.test_connection().await;
        });
    }

    /// Record activity for idle pruning.
    pub fn touch(&self) {
        self.last_seen_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Milliseconds since the epoch of the last activity.
    #[must_use]
    pub fn last_seen_ms(&self) -> i64 {
        self.last_seen_ms.load(Ordering::Relaxed)
    }

    /// Capture the current state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let connection = self.hook.status().await;
        let view = self.view.read().await;
        SessionSnapshot {
            chats: view.chats.chats().to_vec(),
            selected: view.chats.selected_id(),
            typing: view.pending_replies > 0,
            sidebar_open: view.sidebar_open,
            recording: view.recording,
            connection,
            identity: self.identity().clone(),
        }
    }

    /// Send text to the selected chat.
    ///
    /// The user message is appended before the webhook is called; the bot
    /// reply (or the fallback on failure) is appended when the call resolves.
    /// The round trip runs on its own task, so dropping the returned future
    /// does not lose the reply.
    ///
    /// # Errors
    /// Returns an error if no chat is selected.
    pub async fn send_message(self: &Arc<Self>, text: &str) -> SessionResult<SendOutcome> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        let chat_id = {
            let mut view = self.view.write().await;
            let chat_id = view
                .chats
                .selected_id()
                .ok_or(SessionError::NoChatSelected)?;
            let chat = view
                .chats
                .get_mut(chat_id)
                .ok_or(SessionError::UnknownChat(chat_id))?;
            let now = Utc::now();
            chat.push(Message::user_text(text, now));
            chat.last_message = text.to_string();
            chat.timestamp = now;
            view.pending_replies += 1;
            chat_id
        };

        let session = Arc::clone(self);
        let text = text.to_string();
        let reply = tokio::spawn(async move { session.deliver_reply(&text, chat_id).await }).await?;
        Ok(SendOutcome::Sent(reply))
    }

    async fn deliver_reply(&self, text: &str, chat_id: ChatId) -> BotReply {
        let reply = self.hook.send_message(text, chat_id).await;
        let bot = Message::bot_reply(
            reply.bot_message.clone(),
            reply.success,
            !reply.success,
            Utc::now(),
        );

        let mut view = self.view.write().await;
        view.pending_replies = view.pending_replies.saturating_sub(1);
        if let Some(chat) = view.chats.get_mut(chat_id) {
            chat.last_message = reply.bot_message.clone();
            chat.push(bot);
        }
        drop(view);

        tracing::debug!(%chat_id, success = reply.success, "reply appended");
        reply
    }

    /// Announce a file for the selected chat; the file message is appended
    /// only once the webhook accepted the metadata. Like sends, the round
    /// trip outlives the returned future.
    ///
    /// # Errors
    /// Returns an error if no chat is selected or the webhook call fails.
    pub async fn upload_file(self: &Arc<Self>, file: FileMetadata) -> SessionResult<()> {
        let chat_id = self
            .view
            .read()
            .await
            .chats
            .selected_id()
            .ok_or(SessionError::NoChatSelected)?;

        let session = Arc::clone(self);
        tokio::spawn(async move { session.attach_file(file, chat_id).await }).await?
    }

    async fn attach_file(&self, file: FileMetadata, chat_id: ChatId) -> SessionResult<()> {
        self.hook.send_file(&file, chat_id).await?;

        let now = Utc::now();
        let mut view = self.view.write().await;
        let chat = view
            .chats
            .get_mut(chat_id)
            .ok_or(SessionError::UnknownChat(chat_id))?;
        chat.last_message = format!("Fichier: {}", file.name);
        chat.timestamp = now;
        chat.push(Message::user_file(file, now));
        Ok(())
    }

    /// Create a chat at the front of the list, select it and close the
    /// sidebar, then notify the webhook. The chat stays whatever the outcome.
    pub async fn new_chat(&self) -> ChatId {
        let chat = Chat::new_conversation(Utc::now());
        let chat_id = chat.id;
        {
            let mut view = self.view.write().await;
            view.chats.insert_front(chat.clone());
            view.sidebar_open = false;
        }

        if let Err(e) = self.hook.start_new_chat(&chat).await {
            tracing::warn!(%chat_id, "new chat notification failed: {e}");
        }
        chat_id
    }

    /// Select a chat and close the sidebar.
    ///
    /// # Errors
    /// Returns an error if the chat does not exist.
    pub async fn select_chat(&self, chat_id: ChatId) -> SessionResult<()> {
        let mut view = self.view.write().await;
        if !view.chats.select(chat_id) {
            return Err(SessionError::UnknownChat(chat_id));
        }
        view.sidebar_open = false;
        Ok(())
    }

    /// Flip the mobile sidebar.
    pub async fn toggle_sidebar(&self) -> bool {
        let mut view = self.view.write().await;
        view.sidebar_open = !view.sidebar_open;
        view.sidebar_open
    }

    /// Flip the microphone indicator. There is no recording backend.
    pub async fn toggle_recording(&self) -> bool {
        let mut view = self.view.write().await;
        view.recording = !view.recording;
        view.recording
    }

    /// Re-run the connection test.
    pub async fn retry_connection(&self) -> bool {
        self.hook.test_connection().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;

    use super::*;
    use crate::chat::Sender;
    use crate::chat::types::NEW_CHAT_TITLE;
    use crate::test_support::{FakeWebhook, SLOW_MESSAGE, test_identity, unreachable_url};
    use crate::webhook::payload::FALLBACK_BOT_REPLY;

    fn session_for(url: url::Url, chats: Vec<Chat>) -> Arc<ChatSession> {
        let client = Arc::new(WebhookClient::new(url).unwrap());
        Arc::new(ChatSession::new(client, test_identity(), chats))
    }

    fn one_chat() -> Vec<Chat> {
        vec![Chat::new("A", "", Utc::now(), Vec::new())]
    }

    async fn selected_messages(session: &ChatSession) -> Vec<Message> {
        session
            .snapshot()
            .await
            .selected_chat()
            .map(|c| c.messages().to_vec())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let webhook = FakeWebhook::echo().await;
        let session = session_for(webhook.url(), one_chat());

        for text in ["", "   ", "\n\t"] {
            let outcome = session.send_message(text).await.unwrap();
            assert_eq!(outcome, SendOutcome::Ignored);
        }
        assert!(selected_messages(&session).await.is_empty());
        assert!(webhook.received().await.is_empty());
    }

    #[tokio::test]
    async fn test_send_appends_user_then_bot() {
        let webhook = FakeWebhook::echo().await;
        let session = session_for(webhook.url(), one_chat());

        let outcome = session.send_message("Bonjour").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Sent(ref r) if r.success));

        let messages = selected_messages(&session).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].display_text(), "Bonjour");
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].display_text(), "echo: Bonjour");
        assert!(messages[1].delivered_via_webhook);
        assert!(!messages[1].is_error);

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.selected_chat().unwrap().last_message, "echo: Bonjour");
        assert!(!snapshot.typing);
    }

    #[tokio::test]
    async fn test_user_message_visible_before_reply() {
        let webhook = FakeWebhook::echo().await;
        let session = session_for(webhook.url(), one_chat());

        let pending = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.send_message(SLOW_MESSAGE).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let snapshot = session.snapshot().await;
        assert!(snapshot.typing);
        let messages = snapshot.selected_chat().unwrap().messages().to_vec();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::User);

        pending.await.unwrap().unwrap();
        assert_eq!(selected_messages(&session).await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_send_appends_fallback() {
        let session = session_for(unreachable_url().await, one_chat());

        let outcome = session.send_message("Allô ?").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Sent(ref r) if !r.success));

        let messages = selected_messages(&session).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].display_text(), FALLBACK_BOT_REPLY);
        assert!(messages[1].is_error);
        assert!(!messages[1].delivered_via_webhook);

        let snapshot = session.snapshot().await;
        assert!(snapshot.connection.error.is_some());
        assert!(!snapshot.connection.connected);
    }

    #[tokio::test]
    async fn test_replies_land_in_completion_order() {
        let webhook = FakeWebhook::echo().await;
        let session = session_for(webhook.url(), one_chat());

        let slow = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.send_message(SLOW_MESSAGE).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.send_message("rapide").await.unwrap();
        slow.await.unwrap().unwrap();

        let texts: Vec<String> = selected_messages(&session)
            .await
            .iter()
            .map(Message::display_text)
            .collect();
        assert_eq!(texts, vec!["slow", "rapide", "echo: rapide", "echo: slow"]);
    }

    #[tokio::test]
    async fn test_new_chat_goes_first_even_when_offline() {
        let a = Chat::new("A", "", Utc::now(), Vec::new());
        let b = Chat::new("B", "", Utc::now(), Vec::new());
        let session = session_for(unreachable_url().await, vec![a, b]);
        session.toggle_sidebar().await;

        let c_id = session.new_chat().await;

        let snapshot = session.snapshot().await;
        let titles: Vec<&str> = snapshot.chats.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec![NEW_CHAT_TITLE, "A", "B"]);
        assert_eq!(snapshot.selected, Some(c_id));
        assert!(snapshot.selected_chat().unwrap().messages().is_empty());
        assert!(!snapshot.sidebar_open);
        assert!(snapshot.connection.error.is_some());
    }

    #[tokio::test]
    async fn test_new_chat_notifies_webhook() {
        let webhook = FakeWebhook::fixed(StatusCode::OK, "{}").await;
        let session = session_for(webhook.url(), Vec::new());
        let chat_id = session.new_chat().await;

        let received = webhook.received().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["type"], "new_chat");
        assert_eq!(received[0]["chatId"], chat_id.to_string());
    }

    #[tokio::test]
    async fn test_upload_file() {
        let webhook = FakeWebhook::fixed(StatusCode::OK, "{}").await;
        let session = session_for(webhook.url(), one_chat());
        let file = FileMetadata {
            name: "notes.md".to_string(),
            size: 10,
            mime_type: "text/markdown".to_string(),
        };

        session.upload_file(file.clone()).await.unwrap();

        let snapshot = session.snapshot().await;
        let chat = snapshot.selected_chat().unwrap();
        assert_eq!(chat.last_message, "Fichier: notes.md");
        assert_eq!(chat.messages()[0].file(), Some(&file));

        let offline = session_for(unreachable_url().await, one_chat());
        let err = offline.upload_file(file).await.unwrap_err();
        assert!(matches!(err, SessionError::Webhook(_)));
        assert!(selected_messages(&offline).await.is_empty());
    }

    #[tokio::test]
    async fn test_no_chat_selected() {
        let session = session_for(unreachable_url().await, Vec::new());
        let err = session.send_message("x").await.unwrap_err();
        assert!(matches!(err, SessionError::NoChatSelected));
    }

    #[tokio::test]
    async fn test_select_and_toggles() {
        let chats = vec![
            Chat::new("A", "", Utc::now(), Vec::new()),
            Chat::new("B", "", Utc::now(), Vec::new()),
        ];
        let b_id = chats[1].id;
        let session = session_for(unreachable_url().await, chats);

        assert!(session.toggle_sidebar().await);
        session.select_chat(b_id).await.unwrap();
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.selected, Some(b_id));
        assert!(!snapshot.sidebar_open);

        assert!(matches!(
            session.select_chat(ChatId::new()).await,
            Err(SessionError::UnknownChat(_))
        ));

        assert!(session.toggle_recording().await);
        assert!(!session.toggle_recording().await);
    }

    #[tokio::test]
    async fn test_abandoned_send_still_gets_its_reply() {
        let webhook = FakeWebhook::echo().await;
        let session = session_for(webhook.url(), one_chat());

        let pending = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.send_message(SLOW_MESSAGE).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_millis(500)).await;

        let snapshot = session.snapshot().await;
        assert!(!snapshot.typing);
        assert!(!snapshot.connection.loading);
        assert!(snapshot.connection.connected);
        let messages = snapshot.selected_chat().unwrap().messages().to_vec();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].display_text(), "echo: slow");
    }
}
