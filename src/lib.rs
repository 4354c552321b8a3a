//! Knowledge Chat
//!
//! A single-page chat widget for a personal knowledge assistant. The widget
//! forwards user text to the assistant's `/chat/` endpoint and shows the reply
//! together with any search-result citations.
//!
//! # Architecture
//!
//! - **Server**: Axum serves the page and HTML fragments; HTMX drives updates
//! - **Client**: reqwest call to the remote endpoint behind [`client::ChatBackend`]
//! - **UI**: server-rendered HTML strings
//!
//! # Modules
//!
//! - [`conversation`]: Conversation view state and the view store
//! - [`client`]: Outbound chat call
//! - [`model`]: Messages and wire types
//! - [`ui`]: HTML rendering
//! - [`server`]: HTTP routes

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod model;
pub mod server;
pub mod ui;

use std::fmt;
use std::sync::Arc;

use crate::client::ChatBackend;
use crate::config::AppConfig;
use crate::conversation::ViewStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Open conversation views.
    pub views: ViewStore,
    /// Backend used for every submission.
    pub backend: Arc<dyn ChatBackend>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("views", &self.views)
            .field("config", &self.config)
            .finish()
    }
}
