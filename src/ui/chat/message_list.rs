//! Chat message list fragment.

use uuid::Uuid;

use super::{messages_path, render_message};
use crate::config::UiConfig;
use crate::conversation::ConversationView;

/// Element id the input form targets.
pub const MESSAGE_LIST_ID: &str = "message-list";

/// Render the message list of a view.
///
/// While any reply is still in flight the fragment polls itself every second,
/// replacing itself until the last one lands. The typing indicator follows the
/// view's typing flag.
#[must_use]
pub fn render_message_list(view_id: Uuid, view: &ConversationView, ui: &UiConfig) -> String {
    let messages: String = view
        .messages()
        .iter()
        .map(|message| render_message(message, &ui.search_heading))
        .collect();

    let poll = if view.awaiting_replies() > 0 {
        format!(
            r#" hx-get="{path}" hx-trigger="every 1s" hx-swap="outerHTML""#,
            path = messages_path(view_id),
        )
    } else {
        String::new()
    };
    let typing = if view.is_typing() {
        r#"
    <div class="message message-left typing" aria-label="typing"><span></span><span></span><span></span></div>"#
    } else {
        ""
    };

    format!(
        r#"<div id="{MESSAGE_LIST_ID}" class="message-list" aria-live="polite"{poll}>
{messages}{typing}
</div>"#
    )
}
