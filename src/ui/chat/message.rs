//! Content renderer for a single message.

use url::Url;

use crate::model::{Message, SearchResult};
use crate::ui::escape;

/// Render one message: its text bubble, then the citation block when the
/// message carries at least one search result.
#[must_use]
pub fn render_message(message: &Message, search_heading: &str) -> String {
    let position = message.position.as_str();
    let text = escape(&message.content.text);

    let citations = message
        .citations()
        .map(|results| render_citations(results, search_heading))
        .unwrap_or_default();

    format!(
        r#"<div class="message message-{position}" data-position="{position}">
    <div class="bubble">{text}</div>{citations}
</div>"#
    )
}

fn render_citations(results: &[SearchResult], heading: &str) -> String {
    let items: String = results.iter().map(render_citation).collect();
    format!(
        r#"
    <div class="search-results">
        <div class="search-results-heading">{heading}</div>{items}
    </div>"#,
        heading = escape(heading),
    )
}

/// Titles link out in a new browsing context. Only http(s) targets become
/// links; anything else is shown as plain text.
fn render_citation(result: &SearchResult) -> String {
    let title = escape(&result.title);
    let snippet = escape(&result.snippet);

    let title = if is_web_link(&result.url) {
        format!(
            r#"<a href="{href}" target="_blank" rel="noopener noreferrer">{title}</a>"#,
            href = escape(&result.url),
        )
    } else {
        format!(r#"<span class="search-result-title">{title}</span>"#)
    };

    format!(
        r#"
        <div class="search-result">
            {title}
            <div class="search-result-snippet">{snippet}</div>
        </div>"#
    )
}

fn is_web_link(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}
