//! Message bubbles, typing indicator and the scroll anchor.

use super::html::escape;
use crate::chat::{Message, Sender};

/// Text of the typing indicator.
pub const TYPING_LABEL: &str = "L'assistant tape...";

/// Render the scrollable message area.
#[must_use]
pub fn render(messages: &[Message], typing: bool) -> String {
    let mut out = String::from(r#"<section class="messages" id="messages">"#);
    out.push('\n');

    for message in messages {
        out.push_str(&render_message(message));
    }

    // Always present so a submitted form can reveal it before the reply lands.
    let hidden = if typing { "" } else { " hidden" };
    out.push_str(&format!(
        r#"<div class="bubble-row bot" id="typing-indicator"{hidden}><div class="bubble bot typing"><span class="dots"><i></i><i></i><i></i></span><span class="muted">{}</span></div></div>"#,
        escape(TYPING_LABEL)
    ));
    out.push_str("\n<div id=\"messages-end\"></div>\n</section>\n");
    out
}

fn render_message(message: &Message) -> String {
    let side = message.sender.as_str();
    let tone = match message.sender {
        Sender::User => "user",
        Sender::Bot if message.is_error => "bot error",
        Sender::Bot => "bot",
    };

    let body = message.file().map_or_else(
        || format!("<p>{}</p>", escape(&message.display_text())),
        |file| {
            format!(
                r#"<div class="file"><span aria-hidden="true">📎</span><span>{}</span><span class="download" aria-hidden="true">⤓</span></div>"#,
                escape(&file.name)
            )
        },
    );

    let delivered = if message.delivered_via_webhook {
        r#"<span class="delivered" title="Message envoyé via webhook"></span>"#
    } else {
        ""
    };

    format!(
        r#"<div class="bubble-row {side}"><div class="bubble {tone}">{body}<div class="meta"><span class="time">{time}</span>{delivered}</div></div></div>
"#,
        time = escape(&message.timestamp),
    )
}
