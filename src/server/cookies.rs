//! Cookie-backed identity storage.
//!
//! The persistent scope maps to a long-lived cookie, the session scope to a
//! cookie without `Max-Age` that the browser drops when the session ends.

use std::collections::HashMap;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;

use crate::webhook::identity::{
    AnonymousIdentity, IdentityStore, SESSION_ID_KEY, SessionId, StorageScope,
};

/// Lifetime of the persistent cookie (400 days, the common browser cap).
const PERSISTENT_MAX_AGE_SECS: u64 = 400 * 24 * 60 * 60;

/// Identity store reading request cookies and collecting `Set-Cookie` values.
#[derive(Debug, Default)]
pub struct CookieIdentityStore {
    cookies: HashMap<String, String>,
    pending: Vec<HeaderValue>,
}

impl CookieIdentityStore {
    /// Parse every `Cookie` header of a request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| raw.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();
        Self {
            cookies,
            pending: Vec::new(),
        }
    }

    /// `Set-Cookie` values for identifiers generated during this request.
    #[must_use]
    pub fn into_set_cookies(self) -> Vec<HeaderValue> {
        self.pending
    }
}

impl IdentityStore for CookieIdentityStore {
    fn load(&self, _scope: StorageScope, key: &str) -> Option<String> {
        self.cookies.get(key).cloned()
    }

    fn store(&mut self, scope: StorageScope, key: &str, value: String) {
        let cookie = match scope {
            StorageScope::Persistent => format!(
                "{key}={value}; Path=/; Max-Age={PERSISTENT_MAX_AGE_SECS}; SameSite=Lax; HttpOnly"
            ),
            StorageScope::Session => format!("{key}={value}; Path=/; SameSite=Lax; HttpOnly"),
        };
        if let Ok(header) = HeaderValue::from_str(&cookie)
            .inspect_err(|e| tracing::warn!("unable to encode cookie {key}: {e}"))
        {
            self.pending.push(header);
        }
        self.cookies.insert(key.to_string(), value);
    }
}

/// Resolve the identity of a request; returns the `Set-Cookie` values to send back.
#[must_use]
pub fn resolve_identity(headers: &HeaderMap) -> (AnonymousIdentity, Vec<HeaderValue>) {
    let mut store = CookieIdentityStore::from_headers(headers);
    let identity = AnonymousIdentity::resolve(&mut store);
    (identity, store.into_set_cookies())
}

/// Session id carried by the request, without generating one.
#[must_use]
pub fn session_cookie(headers: &HeaderMap) -> Option<SessionId> {
    CookieIdentityStore::from_headers(headers)
        .load(StorageScope::Session, SESSION_ID_KEY)
        .filter(|v| !v.is_empty())
        .map(SessionId::from_stored)
}

/// Append `Set-Cookie` headers to a response.
#[must_use]
pub fn with_cookies(mut response: Response, cookies: Vec<HeaderValue>) -> Response {
    for cookie in cookies {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}
