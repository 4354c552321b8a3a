//! Chat message model and the wire types of the `/chat/` endpoint.
//!
//! Messages are what the widget displays; [`ChatRequest`] and [`ChatReply`]
//! are what travels to and from the knowledge assistant backend.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Backend-assigned conversation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the conversation a message is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Assistant replies and error notices.
    Left,
    /// Text typed by the user.
    Right,
}

impl Position {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Message payload kind. Only plain text is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
}

/// A titled, linked snippet returned alongside a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    /// Some backend builds name this field `link`.
    #[serde(alias = "link")]
    pub url: String,
}

/// Text plus optional citations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub text: String,
    #[serde(
        rename = "searchResults",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub search_results: Option<Vec<SearchResult>>,
}

/// One entry in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: MessageContent,
    pub position: Position,
}

impl Message {
    /// Right-aligned message carrying the user's raw input.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: MessageContent {
                text: text.into(),
                search_results: None,
            },
            position: Position::Right,
        }
    }

    /// Left-aligned message, optionally with citations.
    pub fn assistant(text: impl Into<String>, search_results: Option<Vec<SearchResult>>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: MessageContent {
                text: text.into(),
                search_results,
            },
            position: Position::Left,
        }
    }

    /// Citations to display, or `None` when there are none.
    #[must_use]
    pub fn citations(&self) -> Option<&[SearchResult]> {
        self.content
            .search_results
            .as_deref()
            .filter(|results| !results.is_empty())
    }
}

/// Body of `POST {base_url}/chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Serialized as `null` until the backend has assigned one.
    pub session_id: Option<SessionId>,
}

/// Successful response of `POST {base_url}/chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, deserialize_with = "deserialize_search_results")]
    pub search_results: Option<Vec<SearchResult>>,
    pub session_id: SessionId,
    /// Model that produced the reply, when the backend reports it.
    #[serde(default)]
    pub model: Option<String>,
}

/// Accepts either a bare result array or the `{ "results": [...] }` envelope the
/// search service produces. Anything else is treated as "no results".
fn deserialize_search_results<'de, D>(deserializer: D) -> Result<Option<Vec<SearchResult>>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = match Option::<Value>::deserialize(deserializer)? {
        Some(list @ Value::Array(_)) => list,
        Some(Value::Object(mut envelope)) => match envelope.remove("results") {
            Some(list @ Value::Array(_)) => list,
            _ => return Ok(None),
        },
        _ => return Ok(None),
    };

    serde_json::from_value(list)
        .map(Some)
        .map_err(serde::de::Error::custom)
}
