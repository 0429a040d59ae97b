//! Test doubles for the completion seam: an in-process mock and a fake
//! OpenAI-compatible HTTP endpoint.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};

use super::config::{LlmConfig, LlmTimeouts};
use super::types::{ChatCompletion, GenerationParams, LlmError, Message};

// =========================================================================
// MockCompletion
// =========================================================================

/// Records every call and replays queued results; answers `"done"` once the
/// queue is empty.
pub struct MockCompletion {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    pub calls: Mutex<Vec<(Vec<Message>, GenerationParams)>>,
}

impl MockCompletion {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self { responses: Mutex::new(responses), calls: Mutex::new(Vec::new()) }
    }

    pub fn last_call(&self) -> (Vec<Message>, GenerationParams) {
        self.calls
            .lock()
            .expect("mock mutex should lock")
            .last()
            .cloned()
            .expect("mock was never called")
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock mutex should lock").len()
    }
}

#[async_trait::async_trait]
impl ChatCompletion for MockCompletion {
    async fn complete(&self, messages: &[Message], params: GenerationParams) -> Result<String, LlmError> {
        self.calls
            .lock()
            .expect("mock mutex should lock")
            .push((messages.to_vec(), params));
        let mut responses = self.responses.lock().expect("mock mutex should lock");
        if responses.is_empty() { Ok("done".into()) } else { responses.remove(0) }
    }
}

// =========================================================================
// Fake endpoint
// =========================================================================

/// A request captured by the fake endpoint: `Authorization` header and JSON body.
pub type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

/// Serve `POST /v1/chat/completions` on an ephemeral port, answering every
/// request with `status` and `body`. Returns the base URL and the capture log.
pub async fn spawn_fake_endpoint(status: StatusCode, body: Value) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let log = captured.clone();
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let log = log.clone();
            let body = body.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                log.lock().expect("capture mutex should lock").push((auth, request));
                (status, Json(body))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake endpoint failed");
    });
    (format!("http://{addr}/v1"), captured)
}

/// Serve `POST /v1/chat/completions` that waits `delay` before answering
/// with `body`. Returns the base URL.
pub async fn spawn_slow_endpoint(delay: Duration, body: Value) -> String {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let body = body.clone();
            async move {
                tokio::time::sleep(delay).await;
                Json(body)
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("slow endpoint failed");
    });
    format!("http://{addr}/v1")
}

/// A successful chat completions body carrying `text`.
pub fn completion_body(text: &str) -> Value {
    json!({
        "id": "cmpl-test",
        "model": "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 4 }
    })
}

pub fn test_config(base_url: &str) -> LlmConfig {
    LlmConfig {
        api_key: "test-key".into(),
        model: "test-model".into(),
        base_url: base_url.into(),
        timeouts: LlmTimeouts { request_secs: 5, connect_secs: 2 },
    }
}
