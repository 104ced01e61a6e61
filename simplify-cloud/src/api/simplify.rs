//! AI proxy endpoint
//!
//! POST /api/simplify
//!
//! ```text
//! body ─► validate ─► entitlement ─► quota (free + simplify only) ─► model ─► {"result": …}
//! ```

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use shared::models::{SimplifyRequest, SimplifyResponse};
use simplify_ai::{ParsedResult, TaskRequest};
use tokio_util::sync::CancellationToken;

use super::parse_json;
use crate::auth::{UsageLimiter, client_identity};
use crate::error::ServiceError;
use crate::state::AppState;

/// Client session header; a newer request of the same session and task
/// supersedes the in-flight one
pub const SESSION_HEADER: &str = "x-session-id";

pub async fn handle_simplify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SimplifyResponse<ParsedResult>>, ServiceError> {
    let body: SimplifyRequest = parse_json(&body)?;
    let mut request = TaskRequest::from_request(&body)?;
    state.proxy.ensure_configured()?;

    let email = body.email.as_deref();
    let entitlement = state.entitlements.resolve(email).await?;
    if !entitlement.is_pro {
        request = request.without_reduction();
        if request.task().is_metered() {
            let identity = client_identity(email, &headers);
            state.limiter.try_consume(&identity, UsageLimiter::today()).await?;
        }
    }

    let session = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let guard = session.map(|s| state.inflight.begin(s, request.task()));
    let cancel = guard
        .as_ref()
        .map(|g| g.token().clone())
        .unwrap_or_else(CancellationToken::new);

    let result = state.proxy.run(&request, &cancel).await?;
    Ok(Json(SimplifyResponse { result }))
}
