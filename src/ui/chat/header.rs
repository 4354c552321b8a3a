//! Chat navbar.

use crate::ui::escape;

/// Navbar with the widget title.
#[must_use]
pub fn render_header(title: &str) -> String {
    format!(
        r#"<header class="navbar">
    <svg class="navbar-icon" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
        <path d="m12 3-1.912 5.813a2 2 0 0 1-1.275 1.275L3 12l5.813 1.912a2 2 0 0 1 1.275 1.275L12 21l1.912-5.813a2 2 0 0 1 1.275-1.275L21 12l-5.813-1.912a2 2 0 0 1-1.275-1.275L12 3Z"/>
    </svg>
    <h1 class="navbar-title">{title}</h1>
</header>"#,
        title = escape(title),
    )
}
