//! Lemon Squeezy webhook handler
//!
//! POST /api/lemonsqueezy/webhook: raw body for signature verification

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};

use super::parse_json;
use crate::error::ServiceError;
use crate::lemonsqueezy::{self, SIGNATURE_HEADER, WebhookPayload};
use crate::services::Ack;
use crate::state::AppState;

/// Handle an incoming webhook event
///
/// Signature and body are checked before any store work. Only a body that is
/// not JSON is rejected; every other verified event is acknowledged with
/// `{"ok": true}`, stored or not.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let secret = state
        .signing_secret
        .as_deref()
        .ok_or_else(|| AppError::config("webhook secret"))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            tracing::warn!("Missing X-Signature header");
            AppError::new(ErrorCode::SignatureMissing)
        })?;

    if !lemonsqueezy::verify_signature(&body, signature, secret) {
        tracing::warn!("Webhook signature verification failed");
        return Err(AppError::new(ErrorCode::SignatureInvalid).into());
    }

    let raw: Value = parse_json(&body)?;
    let payload = WebhookPayload::from_value(&raw);

    match state.webhooks.ingest(&payload, &raw).await? {
        Ack::Ignored(reason) => {
            tracing::info!(event_name = payload.event_name().unwrap_or("-"), %reason, "Webhook acknowledged without write");
        }
        Ack::Stale => {
            tracing::info!(event_name = payload.event_name().unwrap_or("-"), "Out-of-order webhook skipped");
        }
        Ack::Stored => {}
    }

    Ok(Json(json!({ "ok": true })))
}
