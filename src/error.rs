//! Error types for the outbound chat call.

use std::borrow::Cow;

use serde_json::Value;
use thiserror::Error;

/// Failure of one `/chat/` round trip.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Connect failure, timeout, or an undecodable body.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `detail` field of the error body, when present.
        detail: Option<String>,
        /// Raw response body.
        body: String,
    },

    /// The configured base URL cannot address the chat endpoint.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ChatError {
    /// Build an [`ChatError::Api`] from a status and raw body.
    pub fn api(status: u16, body: String) -> Self {
        let detail = detail_from_body(&body);
        Self::Api {
            status,
            detail,
            body,
        }
    }

    /// Server-supplied detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref().filter(|d| !d.is_empty()),
            _ => None,
        }
    }

    /// Human-readable reason: server detail, then the error message, then `fallback`.
    #[must_use]
    pub fn reason<'a>(&'a self, fallback: &'a str) -> Cow<'a, str> {
        if let Some(detail) = self.detail() {
            return Cow::Borrowed(detail);
        }
        let message = self.to_string();
        if message.trim().is_empty() {
            Cow::Borrowed(fallback)
        } else {
            Cow::Owned(message)
        }
    }
}

/// Pull `detail` out of a JSON error body. Non-string details (validation
/// error lists) are kept as compact JSON.
fn detail_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Result type alias for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
