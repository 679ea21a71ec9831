//! Shared helpers for unit tests: a throwaway webhook bound to localhost.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

use crate::webhook::identity::{AnonymousIdentity, SessionId, UserId};

/// Message text that makes the echo webhook answer late.
pub const SLOW_MESSAGE: &str = "slow";

#[derive(Clone)]
enum Reply {
    Fixed(StatusCode, String),
    Echo,
}

#[derive(Clone)]
struct HookState {
    reply: Reply,
    received: Arc<Mutex<Vec<Value>>>,
}

/// A webhook served on `127.0.0.1:<random>` that records every body it receives.
pub struct FakeWebhook {
    url: Url,
    received: Arc<Mutex<Vec<Value>>>,
}

impl FakeWebhook {
    /// Always answer with `status` and the raw `body`.
    pub async fn fixed(status: StatusCode, body: &str) -> Self {
        Self::spawn(Reply::Fixed(status, body.to_string())).await
    }

    /// Answer user messages with `{"message": "echo: <text>"}`, everything else with `{}`.
    /// The text [`SLOW_MESSAGE`] is answered after a delay.
    pub async fn echo() -> Self {
        Self::spawn(Reply::Echo).await
    }

    async fn spawn(reply: Reply) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = HookState {
            reply,
            received: Arc::clone(&received),
        };
        let app = Router::new().route("/hook", post(handle)).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: Url::parse(&format!("http://{addr}/hook")).unwrap(),
            received,
        }
    }

    /// Webhook URL.
    pub fn url(&self) -> Url {
        self.url.clone()
    }

    /// Bodies received so far, in arrival order.
    pub async fn received(&self) -> Vec<Value> {
        self.received.lock().await.clone()
    }
}

async fn handle(State(state): State<HookState>, Json(body): Json<Value>) -> (StatusCode, String) {
    state.received.lock().await.push(body.clone());
    match state.reply {
        Reply::Fixed(status, text) => (status, text),
        Reply::Echo => {
            let Some(text) = body.get("message").and_then(Value::as_str) else {
                return (StatusCode::OK, "{}".to_string());
            };
            if text == SLOW_MESSAGE {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            (
                StatusCode::OK,
                json!({ "message": format!("echo: {text}") }).to_string(),
            )
        }
    }
}

/// A URL nothing listens on.
pub async fn unreachable_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/hook")).unwrap()
}

/// A freshly generated identity.
pub fn test_identity() -> AnonymousIdentity {
    AnonymousIdentity {
        user_id: UserId::generate(),
        session_id: SessionId::generate(),
    }
}
