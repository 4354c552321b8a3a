use axum::{
    Form, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

use crate::AppState;
use crate::client::HttpChatBackend;
use crate::config::AppConfig;
use crate::conversation::{ViewHandle, ViewStore};
use crate::ui::chat::{render_message_list, render_not_found, render_page};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let backend = HttpChatBackend::new(&config.backend)?;
    info!(
        name: "backend.config.loaded",
        endpoint = %backend.endpoint(),
        timeout_ms = config.backend.timeout_ms,
        model = ?config.backend.model,
        "Chat backend configured"
    );

    let views = ViewStore::new(config.ui.clone());
    let sweeper = views.spawn_sweeper(
        config.server.view_idle_timeout(),
        config.server.view_sweep_interval(),
    );

    let state = AppState {
        views,
        backend: Arc::new(backend),
        config: Arc::clone(&config),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    sweeper.abort();
    Ok(())
}

/// Build the widget router around `state`.
pub fn build_router(state: AppState) -> Router {
    let timeout = state.config.server.request_timeout();

    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(|| async { "ok" }))
        .route("/c/{id}", get(page_handler))
        .route("/c/{id}/messages", get(messages_handler).post(submit_handler))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                request_timeout(timeout, req, next).await
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn request_timeout(duration: Duration, req: Request, next: Next) -> Response {
    match tokio::time::timeout(duration, next.run(req)).await {
        Ok(res) => res,
        Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(name: "server.stopping", "Shutdown signal received");
}

// ─────────────────────────────────────────────────────────────────────────────
// Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Open a new conversation view.
async fn index_handler(State(state): State<AppState>) -> Redirect {
    let view = state.views.create();
    info!(
        name: "view.created",
        view_id = %view.id(),
        open_views = state.views.len(),
        "Conversation view created"
    );
    Redirect::to(&format!("/c/{}", view.id()))
}

/// GET /c/:id - Full chat page.
async fn page_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.views.get(&id) {
        Some(view) => {
            let html = view
                .inspect(|v| render_page(id, v, &state.config.ui))
                .await;
            Html(html).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Html(render_not_found(&state.config.ui)),
        )
            .into_response(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fragment Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form body posted by the input area.
#[derive(Debug, Deserialize)]
struct SubmitForm {
    #[serde(default)]
    message: String,
}

/// GET /c/:id/messages - Message list fragment.
async fn messages_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, StatusCode> {
    let view = state.views.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Html(message_list(&state, &view).await))
}

/// POST /c/:id/messages - Submit user text.
///
/// The user's message is appended before responding; the backend call runs
/// in the background and its result shows up on the next poll.
async fn submit_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Form(form): Form<SubmitForm>,
) -> Result<Response, StatusCode> {
    let view = state.views.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    match view.begin(&form.message).await {
        Some(turn) => {
            let backend = Arc::clone(&state.backend);
            let handle = view.clone();
            tokio::spawn(async move {
                let outcome = backend.send(turn.request()).await;
                handle.finish(outcome).await;
            });
        }
        None => debug!(view_id = %id, "Ignoring blank submission"),
    }

    if !headers.contains_key("hx-request") {
        return Ok(Redirect::to(&format!("/c/{id}")).into_response());
    }

    Ok(Html(message_list(&state, &view).await).into_response())
}

async fn message_list(state: &AppState, view: &ViewHandle) -> String {
    let id = view.id();
    view.inspect(|v| render_message_list(id, v, &state.config.ui))
        .await
}
