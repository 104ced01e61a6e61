//! Health check endpoint

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::state::AppState;

/// Liveness plus a store round-trip
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, store) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e, "Health check: store unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "ok" } else { "degraded" },
            "service": "simplify-cloud",
            "version": env!("CARGO_PKG_VERSION"),
            "store": store,
        })),
    )
}
