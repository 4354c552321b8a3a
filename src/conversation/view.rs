//! Conversation view state and the submit flow.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::client::ChatBackend;
use crate::config::UiConfig;
use crate::error::{ChatError, Result};
use crate::model::{ChatReply, ChatRequest, Message, SessionId};

/// State behind one chat widget.
///
/// Messages are append-only and kept in send/receive order. The session id
/// is taken from the first successful reply and never replaced.
///
/// `typing` is cleared by whichever reply lands first, so the number of
/// calls still in flight is tracked separately.
#[derive(Debug, Clone)]
pub struct ConversationView {
    messages: Vec<Message>,
    session_id: Option<SessionId>,
    typing: bool,
    in_flight: usize,
    error_prefix: String,
    unknown_error: String,
}

/// An accepted submission waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    request: ChatRequest,
}

impl PendingTurn {
    /// Outbound body, with the session id current when the turn began.
    #[must_use]
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

impl Default for ConversationView {
    fn default() -> Self {
        Self::new(&UiConfig::default())
    }
}

impl ConversationView {
    /// Empty view using the error strings from `ui`.
    #[must_use]
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            messages: Vec::new(),
            session_id: None,
            typing: false,
            in_flight: 0,
            error_prefix: ui.error_prefix.clone(),
            unknown_error: ui.unknown_error.clone(),
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Number of submitted turns whose reply has not landed yet.
    #[must_use]
    pub fn awaiting_replies(&self) -> usize {
        self.in_flight
    }

    /// Synchronous half of a submission.
    ///
    /// Returns `None` and leaves the view untouched when `text` is blank.
    /// Otherwise appends the user's message as typed, raises the typing
    /// indicator, and returns the request to send.
    pub fn begin(&mut self, text: &str) -> Option<PendingTurn> {
        if text.trim().is_empty() {
            return None;
        }

        self.messages.push(Message::user(text));
        self.typing = true;
        self.in_flight += 1;

        Some(PendingTurn {
            request: ChatRequest {
                message: text.to_string(),
                session_id: self.session_id,
            },
        })
    }

    /// Resume half of a submission: records the reply or an error notice and
    /// always clears the typing indicator.
    pub fn finish(&mut self, outcome: Result<ChatReply>) {
        match outcome {
            Ok(reply) => {
                if self.session_id.is_none() {
                    info!(session_id = %reply.session_id, "Conversation bound to backend session");
                    self.session_id = Some(reply.session_id);
                }
                self.messages
                    .push(Message::assistant(reply.response, reply.search_results));
            }
            Err(err) => {
                error!(name: "chat.request.failed", error = ?err, "Chat request failed");
                let text = self.error_text(&err);
                self.messages.push(Message::assistant(text, None));
            }
        }
        self.typing = false;
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn error_text(&self, err: &ChatError) -> String {
        format!("{}{}", self.error_prefix, err.reason(&self.unknown_error))
    }
}

/// Shared handle to a [`ConversationView`] registered in the view store.
///
/// The lock is only held for the synchronous halves of a submission, never
/// across the backend call, so overlapping submissions race.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    id: Uuid,
    inner: Arc<Mutex<ConversationView>>,
    last_activity: Arc<RwLock<Instant>>,
}

impl ViewHandle {
    pub(crate) fn new(id: Uuid, view: ConversationView) -> Self {
        Self {
            id,
            inner: Arc::new(Mutex::new(view)),
            last_activity: Arc::new(RwLock::new(Instant::now())),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Update the last activity timestamp.
    pub(crate) fn touch(&self) {
        *self
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Check if the view has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *self
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        last.elapsed() > timeout
    }

    /// Run `f` against the current state.
    pub async fn inspect<R>(&self, f: impl FnOnce(&ConversationView) -> R) -> R {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> ConversationView {
        self.inspect(ConversationView::clone).await
    }

    pub async fn begin(&self, text: &str) -> Option<PendingTurn> {
        self.inner.lock().await.begin(text)
    }

    pub async fn finish(&self, outcome: Result<ChatReply>) {
        self.inner.lock().await.finish(outcome);
        self.touch();
    }

    /// Full submission: begin, call the backend, finish.
    ///
    /// Returns `false` when `text` was blank and nothing was sent.
    pub async fn submit(&self, backend: &dyn ChatBackend, text: &str) -> bool {
        let Some(turn) = self.begin(text).await else {
            return false;
        };
        let outcome = backend.send(turn.request()).await;
        self.finish(outcome).await;
        true
    }
}
