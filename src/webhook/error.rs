//! Error types for the webhook client.

use thiserror::Error;

/// Errors that can occur while talking to the webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Network failure or transport-level error.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// The webhook answered with a non-2xx status.
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// The request or response body was not valid JSON.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Convenience result alias for webhook operations.
pub type WebhookResult<T> = Result<T, WebhookError>;
