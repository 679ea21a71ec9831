//! HTTP client for the single chat webhook.
//!
//! One POST per call: no retry, no timeout, no idempotency key. Any non-2xx
//! status, transport failure or unparseable body is an error.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

use super::error::{WebhookError, WebhookResult};
use super::identity::AnonymousIdentity;
use super::payload::{BotReply, WebhookEnvelope, WebhookEvent};
use crate::chat::{Chat, ChatId, FileMetadata};

/// Async client bound to one webhook URL.
pub struct WebhookClient {
    client: reqwest::Client,
    url: Url,
    connected: AtomicBool,
}

impl WebhookClient {
    /// Create a client for the given webhook.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Url) -> WebhookResult<Self> {
        Ok(Self {
            client: Self::build_client()?,
            url,
            connected: AtomicBool::new(false),
        })
    }

    fn build_client() -> WebhookResult<reqwest::Client> {
        use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| WebhookError::HttpClient(e.to_string()))
    }

    /// Whether the most recent call succeeded.
    #[must_use]
    pub fn connection_status(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Post an event stamped with the current time.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status or a non-JSON body.
    pub async fn send(&self, event: &WebhookEvent) -> WebhookResult<Value> {
        self.send_at(event, Utc::now()).await
    }

    /// Post an event stamped with an explicit time.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status or a non-JSON body.
    pub async fn send_at(&self, event: &WebhookEvent, at: DateTime<Utc>) -> WebhookResult<Value> {
        let result = self.post(event, at).await;
        self.connected.store(result.is_ok(), Ordering::Relaxed);
        if let Err(e) = &result {
            tracing::warn!(kind = event.kind(), "webhook call failed: {e}");
        }
        result
    }

    async fn post(&self, event: &WebhookEvent, at: DateTime<Utc>) -> WebhookResult<Value> {
        let envelope = WebhookEnvelope::new(event, at);
        tracing::debug!(kind = event.kind(), url = %self.url, "posting webhook event");

        let response = self
            .client
            .post(self.url.clone())
            .json(&envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a user message and turn the outcome into a displayable reply.
    /// Never fails: failures come back as `success == false` with a fallback text.
    pub async fn get_bot_response(
        &self,
        message: &str,
        chat_id: ChatId,
        identity: &AnonymousIdentity,
    ) -> BotReply {
        let event = WebhookEvent::user_message(message, chat_id, identity);
        self.send(&event)
            .await
            .map_or_else(|e| BotReply::failed(e.to_string()), BotReply::from_body)
    }

    /// Notify the webhook of a file picked for a chat.
    ///
    /// # Errors
    /// Returns an error if the webhook call fails.
    pub async fn send_file_metadata(
        &self,
        file: &FileMetadata,
        chat_id: ChatId,
        identity: &AnonymousIdentity,
    ) -> WebhookResult<Value> {
        let event = WebhookEvent::file_upload(file, chat_id, identity);
        self.send(&event).await
    }

    /// Notify the webhook of a new chat. The chat's own timestamp stamps the event.
    ///
    /// # Errors
    /// Returns an error if the webhook call fails.
    pub async fn start_new_chat(
        &self,
        chat: &Chat,
        identity: &AnonymousIdentity,
    ) -> WebhookResult<Value> {
        let event = WebhookEvent::new_chat(chat, identity);
        self.send_at(&event, chat.timestamp).await
    }

    /// Probe the webhook.
    pub async fn test_connection(&self, identity: &AnonymousIdentity) -> bool {
        let event = WebhookEvent::connection_test(identity);
        self.send(&event).await.is_ok()
    }
}
