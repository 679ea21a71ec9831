//! Live browser sessions keyed by session id.
//!
//! The registry is bounded twice: sessions idle past the TTL are pruned, and
//! once the cap is reached the least recently seen session is evicted to make
//! room. A session removed while one of its webhook calls is in flight keeps
//! living through the `Arc` held by that call; the reply lands in the detached
//! session and is dropped with it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::ChatSession;
use crate::chat::seed::demo_chats;
use crate::webhook::{AnonymousIdentity, SessionId, WebhookClient};

/// Thread-safe map of sessions sharing one webhook client.
pub struct SessionRegistry {
    client: Arc<WebhookClient>,
    sessions: DashMap<SessionId, Arc<ChatSession>>,
    seed_demo_chats: bool,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    /// Create an empty registry holding at most `max_sessions` sessions.
    #[must_use]
    pub fn new(
        client: Arc<WebhookClient>,
        seed_demo_chats: bool,
        idle_ttl: Duration,
        max_sessions: usize,
    ) -> Self {
        Self {
            client,
            sessions: DashMap::new(),
            seed_demo_chats,
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Existing session, if any. A hit counts as activity.
    #[must_use]
    pub fn get(&self, session_id: &SessionId) -> Option<Arc<ChatSession>> {
        let session = self.sessions.get(session_id).map(|s| Arc::clone(s.value()))?;
        session.touch();
        Some(session)
    }

    /// Return the session for `identity`, creating and mounting it on first
    /// sight. Must be called from within a Tokio runtime.
    pub fn get_or_create(&self, identity: AnonymousIdentity) -> Arc<ChatSession> {
        if let Some(existing) = self.get(&identity.session_id) {
            return existing;
        }

        self.prune_idle();
        self.evict_overflow();

        let entry = self.sessions.entry(identity.session_id.clone());
        match entry {
            Entry::Occupied(entry) => {
                let session = Arc::clone(entry.get());
                session.touch();
                session
            }
            Entry::Vacant(entry) => {
                let chats = if self.seed_demo_chats {
                    demo_chats()
                } else {
                    Vec::new()
                };
                tracing::info!(session_id = %identity.session_id, "new browser session");
                let session = Arc::new(ChatSession::new(Arc::clone(&self.client), identity, chats));
                entry.insert(Arc::clone(&session));
                session.mount();
                session
            }
        }
    }

    /// Drop sessions idle for longer than the TTL. Returns how many were dropped.
    pub fn prune_idle(&self) -> usize {
        self.prune_idle_at(Utc::now().timestamp_millis())
    }

    fn prune_idle_at(&self, now_ms: i64) -> usize {
        let ttl_ms = i64::try_from(self.idle_ttl.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now_ms.saturating_sub(ttl_ms);
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.last_seen_ms() >= cutoff);
        let dropped = before.saturating_sub(self.sessions.len());
        if dropped > 0 {
            tracing::debug!(dropped, "pruned idle sessions");
        }
        dropped
    }

    /// Evict least recently seen sessions until one more fits under the cap.
    fn evict_overflow(&self) {
        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|s| s.value().last_seen_ms())
                .map(|s| s.key().clone());
            let Some(session_id) = oldest else {
                break;
            };
            self.sessions.remove(&session_id);
            tracing::debug!(%session_id, "evicted least recently seen session");
        }
    }
}
