//! Test utilities for buddy-core
//!
//! Provides a mock completion server speaking the chat-completions wire
//! format, used by gateway tests in this crate and API tests in the server
//! crate (via the `test-utils` feature).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tokio::sync::oneshot;

/// How the mock server answers `/chat/completions`
#[derive(Debug, Clone)]
pub enum MockCompletionBehavior {
    /// Well-formed response carrying this text and citations
    Reply {
        text: String,
        citations: Vec<String>,
    },
    /// Well-formed JSON with an empty `choices` array
    MissingChoices,
    /// A 200 whose body is not JSON at all
    InvalidJson,
    /// 401 on every request
    Unauthorized,
    /// 429 on every request
    RateLimited,
}

impl MockCompletionBehavior {
    pub fn reply(text: &str) -> Self {
        Self::Reply {
            text: text.to_string(),
            citations: Vec::new(),
        }
    }
}

/// Mock completion server for gateway testing
pub struct MockCompletionServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCompletionServer {
    /// Start the mock server on an available port with a canned reply
    pub async fn start() -> Self {
        Self::start_with(MockCompletionBehavior::reply(
            "Mock tip: review your recurring costs[1].",
        ))
        .await
    }

    /// Start the mock server with a specific behavior
    pub async fn start_with(behavior: MockCompletionBehavior) -> Self {
        let app = Router::new()
            .route("/chat/completions", post(handle_chat_completions))
            .with_state(Arc::new(behavior));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCompletionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_chat_completions(
    State(behavior): State<Arc<MockCompletionBehavior>>,
    Json(request): Json<serde_json::Value>,
) -> Response {
    let model = request
        .get("model")
        .and_then(|m| m.as_str())
        .unwrap_or("sonar")
        .to_string();

    match behavior.as_ref() {
        MockCompletionBehavior::Reply { text, citations } => Json(serde_json::json!({
            "id": "cmpl-mock",
            "model": model,
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": { "role": "assistant", "content": text }
            }],
            "citations": citations,
        }))
        .into_response(),
        MockCompletionBehavior::MissingChoices => Json(serde_json::json!({
            "id": "cmpl-mock",
            "model": model,
            "choices": [],
        }))
        .into_response(),
        MockCompletionBehavior::InvalidJson => {
            (StatusCode::OK, "this is not json").into_response()
        }
        MockCompletionBehavior::Unauthorized => {
            (StatusCode::UNAUTHORIZED, "invalid api key").into_response()
        }
        MockCompletionBehavior::RateLimited => {
            (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response()
        }
    }
}
