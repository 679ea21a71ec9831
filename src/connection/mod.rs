//! Connection-state tracking around webhook calls.
//!
//! Every call marks itself in flight, clears the previous error, performs
//! exactly one webhook request and then records the outcome. Calls are not
//! serialized: concurrent calls race and the last one to finish decides the
//! connected flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::chat::{Chat, ChatId, FileMetadata};
use crate::webhook::{AnonymousIdentity, BotReply, WebhookClient, WebhookEvent, WebhookResult};

/// Connection tri-state shown by the badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// At least one webhook call is in flight.
    Connecting,
    /// The last completed call succeeded.
    Connected,
    /// The last completed call failed, or none has completed yet.
    Disconnected,
}

/// Snapshot of the hook state for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    /// Derived tri-state.
    pub state: ConnectionState,
    /// Outcome of the last completed call.
    pub connected: bool,
    /// Whether a call is in flight.
    pub loading: bool,
    /// Message of the last failure, cleared when a new call starts.
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    connected: bool,
    error: Option<String>,
}

/// Marks one call in flight until dropped, so a cancelled call still clears `loading`.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Wraps a [`WebhookClient`] for one browser session.
pub struct ConnectionHook {
    client: Arc<WebhookClient>,
    identity: AnonymousIdentity,
    in_flight: AtomicUsize,
    inner: RwLock<Inner>,
}

impl ConnectionHook {
    /// Create a hook that stamps calls with `identity`.
    #[must_use]
    pub fn new(client: Arc<WebhookClient>, identity: AnonymousIdentity) -> Self {
        Self {
            client,
            identity,
            in_flight: AtomicUsize::new(0),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Identity attached to outgoing payloads.
    #[must_use]
    pub const fn identity(&self) -> &AnonymousIdentity {
        &self.identity
    }

    /// Current state.
    pub async fn status(&self) -> ConnectionStatus {
        let inner = self.inner.read().await;
        let loading = self.in_flight.load(Ordering::SeqCst) > 0;
        let state = if loading {
            ConnectionState::Connecting
        } else if inner.connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        ConnectionStatus {
            state,
            connected: inner.connected,
            loading,
            error: inner.error.clone(),
        }
    }

    async fn begin(&self) -> InFlight<'_> {
        let guard = InFlight::enter(&self.in_flight);
        self.inner.write().await.error = None;
        guard
    }

    async fn finish(&self, guard: InFlight<'_>, outcome: Result<(), String>) {
        let mut inner = self.inner.write().await;
        match outcome {
            Ok(()) => inner.connected = true,
            Err(message) => {
                inner.connected = false;
                inner.error = Some(message);
            }
        }
        drop(guard);
    }

    /// Check that the webhook answers.
    pub async fn test_connection(&self) -> bool {
        let guard = self.begin().await;
        let result = self
            .client
            .send(&WebhookEvent::connection_test(&self.identity))
            .await;
        let connected = result.is_ok();
        self.finish(guard, result.map(drop).map_err(|e| e.to_string()))
            .await;
        tracing::debug!(connected, "connection test finished");
        connected
    }

    /// Send a user message; the reply always carries a displayable text.
    pub async fn send_message(&self, text: &str, chat_id: ChatId) -> BotReply {
        let guard = self.begin().await;
        let reply = self
            .client
            .get_bot_response(text, chat_id, &self.identity)
            .await;
        let outcome = if reply.success {
            Ok(())
        } else {
            Err(reply.error.clone().unwrap_or_default())
        };
        self.finish(guard, outcome).await;
        reply
    }

    /// Send file metadata.
    ///
    /// # Errors
    /// Returns the webhook error if the call fails.
    pub async fn send_file(&self, file: &FileMetadata, chat_id: ChatId) -> WebhookResult<Value> {
        let guard = self.begin().await;
        let result = self
            .client
            .send_file_metadata(file, chat_id, &self.identity)
            .await;
        self.finish(guard, result.as_ref().map(drop).map_err(ToString::to_string))
            .await;
        result
    }

    /// Announce a new chat.
    ///
    /// # Errors
    /// Returns the webhook error if the call fails.
    pub async fn start_new_chat(&self, chat: &Chat) -> WebhookResult<Value> {
        let guard = self.begin().await;
        let result = self.client.start_new_chat(chat, &self.identity).await;
        self.finish(guard, result.as_ref().map(drop).map_err(ToString::to_string))
            .await;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use chrono::Utc;

    use super::*;
    use crate::test_support::{FakeWebhook, SLOW_MESSAGE, test_identity, unreachable_url};

    fn hook_for(url: url::Url) -> ConnectionHook {
        let client = Arc::new(WebhookClient::new(url).unwrap());
        ConnectionHook::new(client, test_identity())
    }

    #[tokio::test]
    async fn test_initial_status() {
        let hook = hook_for(unreachable_url().await);
        let status = hook.status().await;
        assert_eq!(status.state, ConnectionState::Disconnected);
        assert!(!status.loading);
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn test_connection_success_marks_connected() {
        let webhook = FakeWebhook::fixed(StatusCode::OK, "{}").await;
        let hook = hook_for(webhook.url());
        assert!(hook.test_connection().await);

        let status = hook.status().await;
        assert_eq!(status.state, ConnectionState::Connected);
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn test_failure_records_error() {
        let hook = hook_for(unreachable_url().await);
        assert!(!hook.test_connection().await);

        let status = hook.status().await;
        assert_eq!(status.state, ConnectionState::Disconnected);
        assert!(status.error.is_some());
    }

    #[tokio::test]
    async fn test_send_message_failure_sets_error() {
        let webhook = FakeWebhook::fixed(StatusCode::BAD_GATEWAY, "{}").await;
        let hook = hook_for(webhook.url());
        let reply = hook.send_message("allo", ChatId::new()).await;
        assert!(!reply.success);

        let status = hook.status().await;
        assert!(!status.connected);
        assert_eq!(status.error.as_deref(), Some("HTTP error! status: 502"));
    }

    #[tokio::test]
    async fn test_file_and_new_chat_outcomes() {
        let webhook = FakeWebhook::fixed(StatusCode::OK, "{}").await;
        let hook = hook_for(webhook.url());
        let file = FileMetadata {
            name: "a.txt".to_string(),
            size: 3,
            mime_type: "text/plain".to_string(),
        };
        assert!(hook.send_file(&file, ChatId::new()).await.is_ok());
        assert!(hook.start_new_chat(&Chat::new_conversation(Utc::now())).await.is_ok());
        assert_eq!(hook.status().await.state, ConnectionState::Connected);

        let offline = hook_for(unreachable_url().await);
        assert!(offline.send_file(&file, ChatId::new()).await.is_err());
        assert!(offline.status().await.error.is_some());
    }

    #[tokio::test]
    async fn test_loading_while_in_flight() {
        let webhook = FakeWebhook::echo().await;
        let hook = Arc::new(hook_for(webhook.url()));

        let pending = {
            let hook = Arc::clone(&hook);
            tokio::spawn(async move { hook.send_message(SLOW_MESSAGE, ChatId::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let status = hook.status().await;
        assert!(status.loading);
        assert_eq!(status.state, ConnectionState::Connecting);

        let reply = pending.await.unwrap();
        assert_eq!(reply.bot_message, "echo: slow");
        assert_eq!(hook.status().await.state, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_cancelled_call_clears_loading() {
        let webhook = FakeWebhook::echo().await;
        let hook = Arc::new(hook_for(webhook.url()));

        let pending = {
            let hook = Arc::clone(&hook);
            tokio::spawn(async move { hook.send_message(SLOW_MESSAGE, ChatId::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(hook.status().await.loading);

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());

        let status = hook.status().await;
        assert!(!status.loading);
        assert_eq!(status.state, ConnectionState::Disconnected);
    }
}
