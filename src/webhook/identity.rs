//! Anonymous identity attached to every outgoing webhook payload.
//!
//! Two identifiers live in two storage scopes:
//! - the user id in the persistent scope (survives browser restarts),
//! - the session id in the session scope (reset when the browser session ends).
//!
//! Storage is abstracted behind [`IdentityStore`] so the server can back it
//! with cookies and tests can back it with a map.

use core::fmt;
#[cfg(test)]
use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Storage key of the user id (persistent scope).
pub const USER_ID_KEY: &str = "chatbot_user_id";
/// Storage key of the session id (session scope).
pub const SESSION_ID_KEY: &str = "chatbot_session_id";

/// Length of the random part of a generated id.
const RANDOM_PART_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Lifetime of a stored identity value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Kept for the life of the browser profile.
    Persistent,
    /// Kept for the life of the browser session.
    Session,
}

/// Key-value storage for identity values, split by scope.
pub trait IdentityStore {
    /// Read a stored value.
    fn load(&self, scope: StorageScope, key: &str) -> Option<String>;

    /// Store a value, replacing any previous one.
    fn store(&mut self, scope: StorageScope, key: &str, value: String);
}

/// Declare a prefixed string identifier.
macro_rules! define_prefixed_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        prefix = $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix every generated value starts with.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!(
                    "{}_{}_{}",
                    Self::PREFIX,
                    random_base36(RANDOM_PART_LEN),
                    chrono::Utc::now().timestamp_millis()
                ))
            }

            /// Wrap a stored value.
            #[must_use]
            pub fn from_stored(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_prefixed_id!(
    /// Anonymous user identifier, stable across browser sessions.
    UserId,
    prefix = "user"
);

define_prefixed_id!(
    /// Browser-session identifier.
    SessionId,
    prefix = "session"
);

/// The pair of identifiers stamped onto outgoing payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousIdentity {
    /// Persistent user id.
    pub user_id: UserId,
    /// Per-session id.
    pub session_id: SessionId,
}

impl AnonymousIdentity {
    /// Resolve both identifiers from a store, generating missing ones.
    pub fn resolve<S: IdentityStore + ?Sized>(store: &mut S) -> Self {
        Self {
            user_id: generate_user_id(store),
            session_id: session_id(store),
        }
    }
}

/// Return the stored user id, generating and storing one on first use.
pub fn generate_user_id<S: IdentityStore + ?Sized>(store: &mut S) -> UserId {
    if let Some(existing) = store
        .load(StorageScope::Persistent, USER_ID_KEY)
        .filter(|v| !v.is_empty())
    {
        return UserId::from_stored(existing);
    }
    let fresh = UserId::generate();
    store.store(StorageScope::Persistent, USER_ID_KEY, fresh.as_str().to_string());
    fresh
}

/// Return the stored session id, generating and storing one on first use.
pub fn session_id<S: IdentityStore + ?Sized>(store: &mut S) -> SessionId {
    if let Some(existing) = store
        .load(StorageScope::Session, SESSION_ID_KEY)
        .filter(|v| !v.is_empty())
    {
        return SessionId::from_stored(existing);
    }
    let fresh = SessionId::generate();
    store.store(StorageScope::Session, SESSION_ID_KEY, fresh.as_str().to_string());
    fresh
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}

/// In-memory identity store, one map per scope.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryIdentityStore {
    persistent: HashMap<String, String>,
    session: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryIdentityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything in the session scope, as closing a tab would.
    pub fn end_session(&mut self) {
        self.session.clear();
    }
}

#[cfg(test)]
impl IdentityStore for MemoryIdentityStore {
    fn load(&self, scope: StorageScope, key: &str) -> Option<String> {
        match scope {
            StorageScope::Persistent => self.persistent.get(key).cloned(),
            StorageScope::Session => self.session.get(key).cloned(),
        }
    }

    fn store(&mut self, scope: StorageScope, key: &str, value: String) {
        let map = match scope {
            StorageScope::Persistent => &mut self.persistent,
            StorageScope::Session => &mut self.session,
        };
        map.insert(key.to_string(), value);
    }
}
