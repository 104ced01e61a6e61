#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use serde_json::Value;
use sha2::Sha256;
use simplify_ai::{AiError, AiResult, ModelBackend, PromptSpec};
use simplify_cloud::store::{MemoryStore, Store};
use simplify_cloud::{AppState, Config, api};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const SECRET: &str = "test-signing-secret";

/// Model backend replaying scripted replies and recording calls
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<AiResult<String>>>,
    calls: Mutex<Vec<(String, String)>>,
    delay: Option<Duration>,
    unconfigured: bool,
}

impl MockBackend {
    pub fn new(replies: Vec<AiResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// (model, prompt) pairs in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn generate(&self, model: &str, spec: &PromptSpec) -> AiResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), spec.prompt_text.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Simple text.".to_string()))
    }

    async fn list_models(&self) -> AiResult<Value> {
        if self.unconfigured {
            return Err(AiError::Config("GEMINI_API_KEY"));
        }
        Ok(serde_json::json!({ "models": [{ "name": "models/gemini-2.5-flash" }] }))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub backend: Arc<MockBackend>,
}

pub fn test_config() -> Config {
    Config {
        signing_secret: Some(SECRET.into()),
        ..Config::default()
    }
}

pub fn app_with(config: Config, backend: MockBackend) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(backend);
    let state = AppState::from_parts(&config, store.clone(), backend.clone());
    TestApp {
        router: api::create_router(state),
        store,
        backend,
    }
}

pub fn app() -> TestApp {
    app_with(test_config(), MockBackend::default())
}

pub fn sign(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn signed_webhook(body: &Value) -> Request<Body> {
    let raw = body.to_string();
    Request::builder()
        .method("POST")
        .uri("/api/lemonsqueezy/webhook")
        .header("content-type", "application/json")
        .header("x-signature", sign(raw.as_bytes()))
        .body(Body::from(raw))
        .unwrap()
}

/// Drive one request through the router and decode the JSON answer
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

/// Uses recorded for `identity` today; the reading adds one more use
pub async fn uses_today(app: &TestApp, identity: &str) -> i32 {
    let day = chrono::Utc::now().date_naive();
    app.store.increment_usage(identity, day).await.unwrap() - 1
}

/// Store an active subscription for `email` through the webhook
pub async fn subscribe(app: &TestApp, email: &str) {
    let (status, _) = send(
        &app.router,
        signed_webhook(&serde_json::json!({
            "meta": { "event_name": "subscription_created" },
            "data": {
                "id": format!("sub-{email}"),
                "attributes": { "user_email": email, "status": "active", "cancelled": false, "variant_id": 1 }
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.store.latest_subscription(&email.to_lowercase(), None).await.unwrap().is_some());
}
