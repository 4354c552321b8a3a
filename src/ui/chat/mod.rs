//! Chat-specific markup.
//!
//! [`render_page`] produces the full document for one view; the server swaps
//! [`render_message_list`] in after every submission and while a reply is
//! pending.

mod header;
mod input_area;
mod message;
mod message_list;
mod shell;

pub use header::render_header;
pub use input_area::render_input_area;
pub use message::render_message;
pub use message_list::{MESSAGE_LIST_ID, render_message_list};
pub use shell::{render_not_found, render_page};

use uuid::Uuid;

/// Path serving the message list of a view, and accepting its submissions.
#[must_use]
pub fn messages_path(view_id: Uuid) -> String {
    format!("/c/{view_id}/messages")
}
