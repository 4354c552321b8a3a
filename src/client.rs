//! HTTP client for the knowledge assistant's `/chat/` endpoint.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::config::BackendConfig;
use crate::error::{ChatError, Result};
use crate::model::{ChatReply, ChatRequest, SessionId};

/// One outbound chat call.
///
/// The conversation view talks to the backend only through this trait.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user message and wait for the reply.
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply>;
}

/// Request body as it goes on the wire.
#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    message: &'a str,
    session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

/// reqwest-backed [`ChatBackend`].
///
/// # Example
///
/// ```rust,no_run
/// use knowledge_chat::client::{ChatBackend, HttpChatBackend};
/// use knowledge_chat::config::BackendConfig;
/// use knowledge_chat::model::ChatRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpChatBackend::new(&BackendConfig::default())?;
/// let reply = backend
///     .send(&ChatRequest { message: "hello".into(), session_id: None })
///     .await?;
/// println!("{} (session {})", reply.response, reply.session_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    endpoint: Url,
    model: Option<String>,
    http: reqwest::Client,
}

impl HttpChatBackend {
    /// Build a client with the configured timeout and a cookie store, so
    /// credentials set by the backend are sent back on later calls.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .cookie_store(true)
            .build()?;
        let mut backend = Self::with_client(&config.base_url, http)?;
        backend.model.clone_from(&config.model);
        Ok(backend)
    }

    /// Create a backend with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        Ok(Self {
            endpoint: chat_endpoint(base_url.as_ref())?,
            model: None,
            http,
        })
    }

    /// Full URL of the chat endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn handle_response(response: reqwest::Response) -> Result<ChatReply> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ChatError::api(status.as_u16(), body))
        }
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
        let body = WireRequest {
            message: &request.message,
            session_id: request.session_id,
            model: self.model.as_deref(),
        };

        info!(
            name: "chat.request.sent",
            endpoint = %self.endpoint,
            session_id = ?request.session_id,
            message_len = request.message.len(),
            "Sending chat request"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;
        let reply = Self::handle_response(response).await?;

        info!(
            name: "chat.response.received",
            session_id = %reply.session_id,
            response_len = reply.response.len(),
            search_results = reply.search_results.as_ref().map_or(0, Vec::len),
            model = ?reply.model,
            "Received chat response"
        );
        debug!(response = %reply.response, "Chat response body");

        Ok(reply)
    }
}

/// `{base_url}/chat/`, keeping any path prefix on the base URL.
fn chat_endpoint(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("chat/")?)
}
