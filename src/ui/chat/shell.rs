//! Chat page shell.

use uuid::Uuid;

use super::{render_header, render_input_area, render_message_list};
use crate::config::UiConfig;
use crate::conversation::ConversationView;
use crate::ui::escape;

const STYLES: &str = r"
    * { box-sizing: border-box; }
    body { margin: 0; font-family: system-ui, sans-serif; background: #f5f5f5; color: #222; }
    .chat-shell { display: flex; flex-direction: column; height: 100vh; max-width: 960px; margin: 0 auto; background: #fff; }
    .navbar { display: flex; align-items: center; gap: 8px; padding: 12px 16px; border-bottom: 1px solid #eee; }
    .navbar-icon { width: 20px; height: 20px; color: #1890ff; }
    .navbar-title { margin: 0; font-size: 18px; }
    .message-list { flex: 1; overflow-y: auto; padding: 16px; display: flex; flex-direction: column; gap: 12px; }
    .message { max-width: 80%; }
    .message-right { align-self: flex-end; }
    .message-left { align-self: flex-start; }
    .bubble { padding: 10px 14px; border-radius: 12px; white-space: pre-wrap; word-break: break-word; background: #fff; border: 1px solid #e5e5e5; }
    .message-right .bubble { background: #1890ff; color: #fff; border-color: #1890ff; }
    .search-results { margin-top: 8px; font-size: 12px; color: #666; }
    .search-results-heading { margin-bottom: 4px; }
    .search-result { margin-bottom: 8px; }
    .search-result a { color: #1890ff; text-decoration: none; }
    .typing span { display: inline-block; width: 6px; height: 6px; margin: 0 2px; border-radius: 50%; background: #bbb; animation: blink 1.2s infinite; }
    .typing span:nth-child(2) { animation-delay: 0.2s; }
    .typing span:nth-child(3) { animation-delay: 0.4s; }
    @keyframes blink { 0%, 80%, 100% { opacity: 0.3; } 40% { opacity: 1; } }
    .composer { display: flex; gap: 8px; padding: 12px 16px; border-top: 1px solid #eee; }
    .composer textarea { flex: 1; resize: none; padding: 10px 12px; border: 1px solid #ddd; border-radius: 8px; font: inherit; }
    .composer button { width: 44px; border: none; border-radius: 8px; background: #1890ff; color: #fff; cursor: pointer; }
    .composer svg { width: 18px; height: 18px; }
";

/// Full HTML document for one conversation view.
#[must_use]
pub fn render_page(view_id: Uuid, view: &ConversationView, ui: &UiConfig) -> String {
    let body = format!(
        r#"<div class="chat-shell">
{header}
{messages}
{input}
</div>"#,
        header = render_header(&ui.title),
        messages = render_message_list(view_id, view, ui),
        input = render_input_area(view_id, &ui.placeholder),
    );
    html_document(&ui.title, &ui.htmx_src, &body)
}

/// Page shown for an unknown view id.
#[must_use]
pub fn render_not_found(ui: &UiConfig) -> String {
    let body = r#"<div class="chat-shell">
    <p style="padding: 16px;">This conversation does not exist. <a href="/">Start a new one</a>.</p>
</div>"#;
    html_document(&ui.title, &ui.htmx_src, body)
}

fn html_document(title: &str, htmx_src: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <script src="{htmx_src}"></script>
    <style>{STYLES}</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
        htmx_src = escape(htmx_src),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_contains_widget_parts() {
        let ui = UiConfig::default();
        let id = Uuid::new_v4();
        let html = render_page(id, &ConversationView::default(), &ui);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>个人知识助手</title>"));
        assert!(html.contains(r#"<h1 class="navbar-title">个人知识助手</h1>"#));
        assert!(html.contains(r#"placeholder="请输入您的问题...""#));
        assert!(html.contains(r#"id="message-list""#));
        assert!(html.contains(&ui.htmx_src));
    }

    #[test]
    fn test_title_is_escaped() {
        let ui = UiConfig {
            title: "<b>Chat</b>".to_string(),
            ..UiConfig::default()
        };
        let html = render_page(Uuid::nil(), &ConversationView::default(), &ui);
        assert!(html.contains("<title>&lt;b&gt;Chat&lt;/b&gt;</title>"));
    }
}
