//! HTTP route handlers for the chat client.
//!
//! Every action is a form post answered with `303 See Other` back to `/`, so
//! the page is always rendered from the session state after the action ran.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Local;
use serde::Deserialize;

use super::cookies::{resolve_identity, session_cookie, with_cookies};
use super::state::AppState;
use crate::chat::{ChatId, FileMetadata};
use crate::session::{ChatSession, SessionError};
use crate::ui;

type HandlerResult = Result<Response, (StatusCode, String)>;

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/session", get(session_state))
        .route("/chats", post(new_chat))
        .route("/chats/{id}/select", post(select_chat))
        .route("/messages", post(send_message))
        .route("/files", post(upload_file))
        .route("/connection/test", post(retry_connection))
        .route("/sidebar/toggle", post(toggle_sidebar))
        .route("/recording/toggle", post(toggle_recording))
        .with_state(state)
}

/// The session of a browser that already has one.
///
/// Requests without a live session are sent back to `/`, the only route that
/// creates sessions, so cookie-less clients never reach the webhook.
pub struct BrowserSession {
    session: Arc<ChatSession>,
}

impl FromRequestParts<Arc<AppState>> for BrowserSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        session_cookie(&parts.headers)
            .and_then(|session_id| state.sessions.get(&session_id))
            .map(|session| Self { session })
            .ok_or_else(|| Redirect::to("/"))
    }
}

/// The session behind a page load, created on first visit, plus the cookies
/// that identify it.
pub struct PageSession {
    session: Arc<ChatSession>,
    set_cookies: Vec<HeaderValue>,
}

impl FromRequestParts<Arc<AppState>> for PageSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (identity, set_cookies) = resolve_identity(&parts.headers);
        let session = state.sessions.get_or_create(identity);
        Ok(Self {
            session,
            set_cookies,
        })
    }
}

fn back_home() -> Response {
    Redirect::to("/").into_response()
}

fn session_error(e: &SessionError) -> (StatusCode, String) {
    let status = match e {
        SessionError::NoChatSelected => StatusCode::CONFLICT,
        SessionError::UnknownChat(_) => StatusCode::NOT_FOUND,
        SessionError::Webhook(_) => StatusCode::BAD_GATEWAY,
        SessionError::Interrupted(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "perfomai-chat",
        "version": env!("CARGO_PKG_VERSION"),
        "webhook_connected": state.client.connection_status(),
        "sessions": state.sessions.len()
    }))
}

/// Query accepted by the page.
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    /// Chat to select before rendering.
    pub chat: Option<String>,
}

/// Render the page.
async fn index(page: PageSession, Query(query): Query<IndexQuery>) -> Response {
    if let Some(chat_id) = query.chat.as_deref().and_then(|raw| raw.parse::<ChatId>().ok()) {
        if let Err(e) = page.session.select_chat(chat_id).await {
            tracing::debug!("ignoring chat query: {e}");
        }
    }
    let snapshot = page.session.snapshot().await;
    let html = ui::render_page(&snapshot, &Local::now());
    with_cookies(Html(html).into_response(), page.set_cookies)
}

/// Session state as JSON.
async fn session_state(browser: BrowserSession) -> Response {
    Json(browser.session.snapshot().await).into_response()
}

async fn new_chat(browser: BrowserSession) -> Response {
    let chat_id = browser.session.new_chat().await;
    tracing::debug!(%chat_id, "chat created");
    back_home()
}

async fn select_chat(browser: BrowserSession, Path(id): Path<String>) -> HandlerResult {
    let chat_id: ChatId = id
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid chat id: {e}")))?;
    browser
        .session
        .select_chat(chat_id)
        .await
        .map_err(|e| session_error(&e))?;
    Ok(back_home())
}

/// Composer form.
#[derive(Debug, Deserialize)]
pub struct MessageForm {
    /// Text typed by the user.
    #[serde(default)]
    pub message: String,
}

async fn send_message(browser: BrowserSession, Form(form): Form<MessageForm>) -> HandlerResult {
    browser
        .session
        .send_message(&form.message)
        .await
        .map_err(|e| session_error(&e))?;
    Ok(back_home())
}

/// File metadata form, filled in by the page script.
#[derive(Debug, Deserialize)]
pub struct FileForm {
    /// File name.
    pub file_name: String,
    /// Size in bytes.
    pub file_size: u64,
    /// MIME type; browsers send an empty string when unknown.
    #[serde(default)]
    pub file_type: String,
}

async fn upload_file(browser: BrowserSession, Form(form): Form<FileForm>) -> HandlerResult {
    if form.file_name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "missing file name".to_string()));
    }
    let file = FileMetadata {
        name: form.file_name,
        size: form.file_size,
        mime_type: form.file_type,
    };
    match browser.session.upload_file(file).await {
        Ok(()) => {}
        // The connection error is already recorded and shown in the composer.
        Err(SessionError::Webhook(e)) => tracing::warn!("file upload failed: {e}"),
        Err(e) => return Err(session_error(&e)),
    }
    Ok(back_home())
}

async fn retry_connection(browser: BrowserSession) -> Response {
    let connected = browser.session.retry_connection().await;
    tracing::debug!(connected, "connection retried");
    back_home()
}

async fn toggle_sidebar(browser: BrowserSession) -> Response {
    browser.session.toggle_sidebar().await;
    back_home()
}

async fn toggle_recording(browser: BrowserSession) -> Response {
    browser.session.toggle_recording().await;
    back_home()
}
