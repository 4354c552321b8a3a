use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use knowledge_chat::client::{ChatBackend, HttpChatBackend};
use knowledge_chat::config::BackendConfig;
use knowledge_chat::conversation::ViewStore;
use knowledge_chat::error::ChatError;
use knowledge_chat::model::{ChatRequest, Position, SessionId};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// What the fake assistant saw.
#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    cookies: Arc<Mutex<Vec<Option<String>>>>,
}

// Helper to run a router on an ephemeral port and return its base URL
async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Assigns session 42 to new conversations and cites two results.
async fn assistant(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    rec.bodies.lock().unwrap().push(body.clone());
    rec.cookies.lock().unwrap().push(
        headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let session_id = body["session_id"].as_i64().unwrap_or(42);
    let message = body["message"].as_str().unwrap_or_default();
    (
        [(header::SET_COOKIE, "sid=abc; Path=/")],
        Json(json!({
            "response": format!("you said {message}"),
            "session_id": session_id,
            "model": "test-model",
            "search_results": [
                { "title": "First", "snippet": "one", "url": "https://one.example" },
                { "title": "Second", "snippet": "two", "url": "https://two.example" }
            ]
        })),
    )
        .into_response()
}

fn backend_config(base_url: &str) -> BackendConfig {
    BackendConfig {
        base_url: base_url.to_string(),
        ..BackendConfig::default()
    }
}

#[tokio::test]
async fn test_send_posts_json_and_parses_reply() {
    let rec = Recorded::default();
    let router = Router::new()
        .route("/chat/", post(assistant))
        .with_state(rec.clone());
    let base = spawn_backend(router).await;

    let backend = HttpChatBackend::new(&backend_config(&base)).unwrap();
    assert_eq!(backend.endpoint().as_str(), format!("{base}/chat/"));

    let reply = backend
        .send(&ChatRequest {
            message: "hello".to_string(),
            session_id: None,
        })
        .await
        .unwrap();

    assert_eq!(reply.response, "you said hello");
    assert_eq!(reply.session_id, SessionId(42));
    let titles: Vec<_> = reply
        .search_results
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);

    let bodies = rec.bodies.lock().unwrap().clone();
    assert_eq!(bodies, vec![json!({ "message": "hello", "session_id": null })]);
}

#[tokio::test]
async fn test_model_override_is_forwarded() {
    let rec = Recorded::default();
    let router = Router::new()
        .route("/chat/", post(assistant))
        .with_state(rec.clone());
    let base = spawn_backend(router).await;

    let config = BackendConfig {
        model: Some("Pro/deepseek-ai/DeepSeek-R1".to_string()),
        ..backend_config(&base)
    };
    let backend = HttpChatBackend::new(&config).unwrap();
    backend
        .send(&ChatRequest {
            message: "hi".to_string(),
            session_id: Some(SessionId(3)),
        })
        .await
        .unwrap();

    let bodies = rec.bodies.lock().unwrap().clone();
    assert_eq!(bodies[0]["model"], "Pro/deepseek-ai/DeepSeek-R1");
    assert_eq!(bodies[0]["session_id"], 3);
}

#[tokio::test]
async fn test_cookies_are_sent_back() {
    let rec = Recorded::default();
    let router = Router::new()
        .route("/chat/", post(assistant))
        .with_state(rec.clone());
    let base = spawn_backend(router).await;

    let backend = HttpChatBackend::new(&backend_config(&base)).unwrap();
    for text in ["one", "two"] {
        backend
            .send(&ChatRequest {
                message: text.to_string(),
                session_id: None,
            })
            .await
            .unwrap();
    }

    let cookies = rec.cookies.lock().unwrap().clone();
    assert_eq!(cookies[0], None);
    assert_eq!(cookies[1].as_deref(), Some("sid=abc"));
}

#[tokio::test]
async fn test_server_detail_becomes_api_error() {
    let router = Router::new().route(
        "/chat/",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "An error occurred while processing your request: boom" })),
            )
        }),
    );
    let base = spawn_backend(router).await;

    let backend = HttpChatBackend::new(&backend_config(&base)).unwrap();
    let err = backend
        .send(&ChatRequest {
            message: "hello".to_string(),
            session_id: None,
        })
        .await
        .unwrap_err();

    match &err {
        ChatError::Api { status, detail, .. } => {
            assert_eq!(*status, 500);
            assert_eq!(
                detail.as_deref(),
                Some("An error occurred while processing your request: boom")
            );
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let router = Router::new().route(
        "/chat/",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "response": "late", "session_id": 1 }))
        }),
    );
    let base = spawn_backend(router).await;

    let config = BackendConfig {
        timeout_ms: 100,
        ..backend_config(&base)
    };
    let backend = HttpChatBackend::new(&config).unwrap();
    let err = backend
        .send(&ChatRequest {
            message: "hello".to_string(),
            session_id: None,
        })
        .await
        .unwrap_err();

    match err {
        ChatError::Transport(e) => assert!(e.is_timeout()),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind and drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpChatBackend::new(&backend_config(&format!("http://{addr}"))).unwrap();
    let err = backend
        .send(&ChatRequest {
            message: "hello".to_string(),
            session_id: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Transport(_)));
    assert!(!err.reason("fallback").is_empty());
}

#[tokio::test]
async fn test_conversation_against_http_backend() {
    let rec = Recorded::default();
    let router = Router::new()
        .route("/chat/", post(assistant))
        .with_state(rec.clone());
    let base = spawn_backend(router).await;
    let backend = HttpChatBackend::new(&backend_config(&base)).unwrap();

    let store = ViewStore::default();
    let view = store.create();

    assert!(!view.submit(&backend, "   ").await);
    assert!(view.submit(&backend, "hello").await);
    assert!(view.submit(&backend, "again").await);

    let bodies = rec.bodies.lock().unwrap().clone();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["session_id"], Value::Null);
    assert_eq!(bodies[1]["session_id"], 42);

    let snapshot = view.snapshot().await;
    assert_eq!(snapshot.session_id(), Some(SessionId(42)));
    assert!(!snapshot.is_typing());

    let positions: Vec<_> = snapshot.messages().iter().map(|m| m.position).collect();
    assert_eq!(
        positions,
        vec![Position::Right, Position::Left, Position::Right, Position::Left]
    );
    assert_eq!(snapshot.messages()[1].citations().unwrap().len(), 2);
}
