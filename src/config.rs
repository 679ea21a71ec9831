//! Runtime configuration for the chat client server.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Production webhook the client forwards every event to.
pub const DEFAULT_WEBHOOK_URL: &str = "https://n8n-ns40gos4o88gokog4so4008w.128.140.108.228.sslip.io/webhook/afc97f9b-c8c4-4dad-931e-88f883524475/chat";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default cap on live browser sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Environment variable overriding the webhook URL.
const WEBHOOK_URL_ENV: &str = "PERFOMAI_WEBHOOK_URL";
/// Environment variable overriding the bind address.
const BIND_ENV: &str = "PERFOMAI_BIND";
/// Environment variable overriding the listening port.
const PORT_ENV: &str = "PERFOMAI_PORT";
/// Environment variable toggling the demo conversations.
const DEMO_CHATS_ENV: &str = "PERFOMAI_DEMO_CHATS";
/// Environment variable overriding the idle session TTL (seconds).
const SESSION_TTL_ENV: &str = "PERFOMAI_SESSION_TTL_SECS";
/// Environment variable overriding the session cap.
const MAX_SESSIONS_ENV: &str = "PERFOMAI_MAX_SESSIONS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The webhook URL could not be parsed.
    #[error("invalid webhook url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// A value is present but out of range or malformed.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Convenience result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration for the chat client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatClientConfig {
    /// The single webhook every event is posted to.
    pub webhook_url: Url,
    /// Address the HTTP server binds to.
    pub bind_addr: IpAddr,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Seed every new browser session with the demo conversations.
    pub seed_demo_chats: bool,
    /// Sessions untouched for longer than this are dropped.
    #[serde(with = "duration_secs")]
    pub session_idle_ttl: Duration,
    /// Upper bound on live sessions; the least recently seen one is evicted first.
    pub max_sessions: usize,
}

impl ChatClientConfig {
    /// Create a config for `webhook_url` with default settings.
    #[must_use]
    pub const fn new(webhook_url: Url) -> Self {
        Self {
            webhook_url,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            seed_demo_chats: true,
            session_idle_ttl: Duration::from_secs(86_400),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Load the configuration from `PERFOMAI_*` environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns an error if a value is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_url = lookup(WEBHOOK_URL_ENV).unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string());
        let mut config = Self::new(Url::parse(webhook_url.trim())?);

        if let Some(raw) = lookup(BIND_ENV) {
            config.bind_addr = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{BIND_ENV}={raw}")))?;
        }
        if let Some(raw) = lookup(PORT_ENV) {
            config.port = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{PORT_ENV}={raw}")))?;
        }
        if let Some(raw) = lookup(DEMO_CHATS_ENV) {
            config.seed_demo_chats = parse_flag(&raw)
                .ok_or_else(|| ConfigError::Invalid(format!("{DEMO_CHATS_ENV}={raw}")))?;
        }
        if let Some(raw) = lookup(SESSION_TTL_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{SESSION_TTL_ENV}={raw}")))?;
            config.session_idle_ttl = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(MAX_SESSIONS_ENV) {
            config.max_sessions = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{MAX_SESSIONS_ENV}={raw}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the listening port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable the demo conversations.
    #[must_use]
    pub const fn with_demo_chats(mut self, enabled: bool) -> Self {
        self.seed_demo_chats = enabled;
        self
    }

    /// Set the idle session TTL.
    #[must_use]
    pub const fn with_session_idle_ttl(mut self, ttl: Duration) -> Self {
        self.session_idle_ttl = ttl;
        self
    }

    /// Set the session cap.
    #[must_use]
    pub const fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if the webhook is not an http(s) URL, or the TTL or the
    /// session cap is zero.
    pub fn validate(&self) -> ConfigResult<()> {
        match self.webhook_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "webhook url scheme must be http or https, got {other}"
                )));
            }
        }

        if self.session_idle_ttl.is_zero() {
            return Err(ConfigError::Invalid(
                "session_idle_ttl must be > 0".to_string(),
            ));
        }

        if self.max_sessions == 0 {
            return Err(ConfigError::Invalid("max_sessions must be > 0".to_string()));
        }

        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Serde module for `Duration` as whole seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
