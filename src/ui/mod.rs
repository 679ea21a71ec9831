//! Server-rendered presentation tree.
//!
//! The page is derived entirely from a [`SessionSnapshot`]: sidebar, chat
//! header, message list and composer. Every user action is a plain form post
//! answered with a redirect back to `/`.

pub mod assets;
pub mod composer;
pub mod connection_status;
pub mod html;
pub mod message_list;
pub mod sidebar;

use chrono::{DateTime, Local};

use self::composer::ComposerProps;
use self::html::escape;
use crate::chat::Chat;
use crate::session::SessionSnapshot;

/// Brand logo shown in the sidebar and the header.
pub const LOGO_URL: &str = "https://quest-media-storage-bucket.s3.us-east-2.amazonaws.com/1750745932722-Logo%20Perfomai%20%281%29.png";

/// Render the full page.
#[must_use]
pub fn render_page(snapshot: &SessionSnapshot, now: &DateTime<Local>) -> String {
    let selected = snapshot.selected_chat();
    let title = selected.map_or("Perfomai", |c| c.title.as_str());
    let messages = selected.map(Chat::messages).unwrap_or_default();

    let mut out = String::with_capacity(16 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n<style>", escape(title)));
    out.push_str(assets::STYLE_CSS);
    out.push_str("</style>\n</head>\n<body>\n<div class=\"app\">\n");

    if snapshot.sidebar_open {
        out.push_str(r#"<form method="post" action="/sidebar/toggle" class="mobile-only"><button type="submit" class="overlay" aria-label="Fermer la barre latérale"></button></form>"#);
        out.push('\n');
    }

    out.push_str(&sidebar::render(snapshot, now));
    out.push_str("<main class=\"main\">\n");
    out.push_str(&render_header(snapshot, title));
    out.push_str(&message_list::render(messages, snapshot.typing));
    out.push_str(&composer::render(&ComposerProps {
        loading: snapshot.connection.loading,
        has_chat: selected.is_some(),
        recording: snapshot.recording,
        error: snapshot.connection.error.as_deref(),
    }));
    out.push_str("</main>\n</div>\n<script>");
    out.push_str(assets::PAGE_JS);
    out.push_str("</script>\n</body>\n</html>\n");
    out
}

fn render_header(snapshot: &SessionSnapshot, title: &str) -> String {
    format!(
        r#"<header class="chat-header">
  <div class="title">
    <form method="post" action="/sidebar/toggle" class="inline mobile-only"><button type="submit" class="icon-button" aria-label="Ouvrir la barre latérale">☰</button></form>
    <img src="{LOGO_URL}" alt="Perfomai Logo" class="logo">
    <div><h1>{title}</h1><p class="muted">Assistant IA</p></div>
  </div>
  <div class="row">{badge}<button type="button" class="icon-button" aria-label="Plus d'options">⋮</button></div>
</header>
"#,
        title = escape(title),
        badge = connection_status::render(&snapshot.connection),
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::chat::seed::demo_chats;
    use crate::chat::Message;
    use crate::connection::{ConnectionState, ConnectionStatus};
    use crate::test_support::test_identity;

    fn snapshot(chats: Vec<Chat>, state: ConnectionState) -> SessionSnapshot {
        SessionSnapshot {
            selected: chats.first().map(|c| c.id),
            chats,
            typing: false,
            sidebar_open: false,
            recording: false,
            connection: ConnectionStatus {
                state,
                connected: state == ConnectionState::Connected,
                loading: state == ConnectionState::Connecting,
                error: None,
            },
            identity: test_identity(),
        }
    }

    #[test]
    fn test_page_shows_selected_chat() {
        let html = render_page(
            &snapshot(demo_chats(), ConnectionState::Connected),
            &Local::now(),
        );
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Support Client</h1>"));
        assert!(html.contains("Je n&#39;arrive pas à changer mon mot de passe"));
        assert!(!html.contains("Souhaitez-vous des détails"));
        assert!(html.contains("Informations Produit"));
    }

    #[test]
    fn test_page_without_chats_disables_composer() {
        let html = render_page(&snapshot(Vec::new(), ConnectionState::Disconnected), &Local::now());
        assert!(html.contains("<h1>Perfomai</h1>"));
        assert!(html.contains(r#"aria-label="Saisie de message" disabled"#));
        assert!(html.contains("Hors ligne"));
    }

    #[test]
    fn test_sidebar_overlay_when_open() {
        let mut snap = snapshot(Vec::new(), ConnectionState::Connected);
        snap.sidebar_open = true;
        let mut chat = Chat::new_conversation(Utc::now());
        chat.push(Message::user_text("hello", Utc::now()));
        snap.selected = Some(chat.id);
        snap.chats.push(chat);

        let html = render_page(&snap, &Local::now());
        assert!(html.contains(r#"class="overlay""#));
        assert!(html.contains("sidebar open"));
        assert!(html.contains("<p>hello</p>"));
    }
}
