//! Sidebar: logo, connection badge, new-chat action and the chat history.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use super::html::escape;
use super::{LOGO_URL, connection_status};
use crate::chat::format::{format_date, format_time};
use crate::chat::{Chat, ChatId};
use crate::session::SessionSnapshot;

/// Render the sidebar.
#[must_use]
pub fn render(snapshot: &SessionSnapshot, now: &DateTime<Local>) -> String {
    let open = if snapshot.sidebar_open { " open" } else { "" };
    let mut out = String::new();

    let _ = write!(
        out,
        r#"<aside class="sidebar{open}">
<div class="sidebar-header">
  <div class="row">
    <img src="{LOGO_URL}" alt="Perfomai Logo" class="logo">
    <form method="post" action="/sidebar/toggle" class="inline mobile-only"><button type="submit" class="icon-button" aria-label="Fermer la barre latérale">✕</button></form>
  </div>
  <div class="status-slot">{badge}</div>
  <form method="post" action="/chats"><button type="submit" class="new-chat" aria-label="Commencer un nouveau chat">＋ <span>Nouveau Chat</span></button></form>
</div>
<nav class="history">
  <h3>Conversations Récentes</h3>
"#,
        badge = connection_status::render(&snapshot.connection),
    );

    for chat in &snapshot.chats {
        out.push_str(&render_entry(chat, snapshot.selected, now));
    }

    out.push_str("</nav>\n</aside>\n");
    out
}

fn render_entry(chat: &Chat, selected: Option<ChatId>, now: &DateTime<Local>) -> String {
    let active = if selected == Some(chat.id) { " active" } else { "" };
    let local = chat.timestamp.with_timezone(&Local);
    format!(
        r#"<form method="post" action="/chats/{id}/select"><button type="submit" class="chat-entry{active}">
  <div class="row"><h4>{title}</h4><span class="muted">{date}</span></div>
  <p class="preview">{preview}</p>
  <p class="time">{time}</p>
</button></form>
"#,
        id = chat.id,
        title = escape(&chat.title),
        date = format_date(&local, now),
        preview = escape(&chat.last_message),
        time = format_time(&local),
    )
}
