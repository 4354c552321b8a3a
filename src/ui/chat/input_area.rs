//! Chat input area.

use uuid::Uuid;

use super::{MESSAGE_LIST_ID, messages_path};
use crate::ui::escape;

/// Message form.
///
/// With HTMX loaded the post swaps the returned message list in place;
/// without it the form falls back to a regular post and redirect.
#[must_use]
pub fn render_input_area(view_id: Uuid, placeholder: &str) -> String {
    let path = messages_path(view_id);
    format!(
        r##"<form class="composer" method="post" action="{path}"
      hx-post="{path}"
      hx-target="#{MESSAGE_LIST_ID}"
      hx-swap="outerHTML"
      hx-on--after-request="this.reset()">
    <textarea name="message" rows="1" placeholder="{placeholder}"
              onkeydown="if (event.key === 'Enter' &amp;&amp; !event.shiftKey) {{ event.preventDefault(); this.form.requestSubmit(); }}"></textarea>
    <button type="submit" aria-label="Send">
        <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
            <line x1="22" y1="2" x2="11" y2="13"/>
            <polygon points="22 2 15 22 11 13 2 9 22 2"/>
        </svg>
    </button>
</form>"##,
        placeholder = escape(placeholder),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_targets_message_list() {
        let id = Uuid::new_v4();
        let html = render_input_area(id, "Ask \"anything\"");
        assert!(html.contains(&format!(r#"hx-post="/c/{id}/messages""#)));
        assert!(html.contains(r##"hx-target="#message-list""##));
        assert!(html.contains(r#"placeholder="Ask &quot;anything&quot;""#));
    }
}
