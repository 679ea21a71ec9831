//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::ChatClientConfig;
use crate::session::SessionRegistry;
use crate::webhook::{WebhookClient, WebhookResult};

/// Shared application state.
pub struct AppState {
    /// Loaded configuration.
    pub config: ChatClientConfig,
    /// Webhook client shared by every session.
    pub client: Arc<WebhookClient>,
    /// Live browser sessions.
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Create the state: one webhook client shared by every session.
    ///
    /// # Errors
    /// Returns an error if the webhook client cannot be created.
    pub fn new(config: ChatClientConfig) -> WebhookResult<Arc<Self>> {
        let client = Arc::new(WebhookClient::new(config.webhook_url.clone())?);
        let sessions = SessionRegistry::new(
            Arc::clone(&client),
            config.seed_demo_chats,
            config.session_idle_ttl,
            config.max_sessions,
        );
        Ok(Arc::new(Self {
            config,
            client,
            sessions,
        }))
    }
}
