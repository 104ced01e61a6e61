//! API routes

pub mod health;
pub mod models;
pub mod pro_status;
pub mod simplify;
pub mod webhook;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use shared::error::{AppError, ErrorCode};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the service router
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/lemonsqueezy/webhook",
            post(webhook::handle_webhook).fallback(method_not_allowed),
        )
        .route(
            "/api/pro-status",
            get(pro_status::pro_status_query)
                .post(pro_status::pro_status_body)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/simplify",
            post(simplify::handle_simplify).fallback(method_not_allowed),
        )
        .route("/api/models", get(models::list_models).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(middleware::from_fn(json_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed()
}

async fn not_found() -> AppError {
    AppError::new(ErrorCode::NotFound)
}

/// Give the bare 413/408 answers of the body limit and timeout layers the
/// JSON error body
async fn json_errors(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json {
        return response;
    }
    match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::new(ErrorCode::PayloadTooLarge).into_response(),
        StatusCode::REQUEST_TIMEOUT => AppError::new(ErrorCode::RequestTimeout).into_response(),
        _ => response,
    }
}

/// Parse a JSON body, mapping failures to `InvalidFormat`
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse JSON body");
        AppError::malformed(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn call(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    fn router() -> Router {
        Router::new()
            .route("/timeout", get(|| async { StatusCode::REQUEST_TIMEOUT }))
            .route("/large", get(|| async { (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded") }))
            .route("/quota", get(|| async { AppError::quota_exceeded() }))
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(middleware::from_fn(json_errors))
    }

    #[tokio::test]
    async fn test_bare_layer_errors_get_json_body() {
        let (status, body) = call(router(), "/timeout").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["code"], 10);
        assert_eq!(body["error"], "Request timed out");

        let (status, body) = call(router(), "/large").await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], 8);
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let (status, body) = call(router(), "/quota").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], 2001);

        let (status, body) = call(router(), "/teapot").await;
        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert!(body.is_null());
    }
}
