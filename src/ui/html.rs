//! Minimal HTML helpers.

/// Escape text for use in element content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// ` disabled` when `flag` is set.
#[must_use]
pub const fn disabled_attr(flag: bool) -> &'static str {
    if flag { " disabled" } else { "" }
}
