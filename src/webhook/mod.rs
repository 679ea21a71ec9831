//! Client side of the chat webhook.
//!
//! This module provides:
//! - Typed event envelopes (`user_message`, `file_upload`, `new_chat`, `connection_test`)
//! - The anonymous user/session identity stamped onto them
//! - A single-shot async HTTP client

pub mod client;
pub mod error;
pub mod identity;
pub mod payload;

pub use client::WebhookClient;
pub use error::{WebhookError, WebhookResult};
pub use identity::{AnonymousIdentity, IdentityStore, SessionId, StorageScope, UserId};
pub use payload::{BotReply, WebhookEnvelope, WebhookEvent};
