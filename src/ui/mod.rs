//! Server-rendered HTML for the chat widget.
//!
//! Markup is produced as plain strings and driven by HTMX in the browser: the
//! input form posts to the server and swaps in a freshly rendered message
//! list.
//!
//! # Structure
//!
//! - [`chat`]: page shell, header, message list, message content, input form

pub mod chat;

use std::borrow::Cow;

/// Escape text for use in HTML element content and quoted attribute values.
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
