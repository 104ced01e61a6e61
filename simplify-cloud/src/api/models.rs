//! Upstream model catalog
//!
//! GET /api/models: passthrough of the Gemini model list, for diagnosing
//! model names and credentials.

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use crate::error::ServiceError;
use crate::state::AppState;

pub async fn list_models(State(state): State<AppState>) -> Result<Json<Value>, ServiceError> {
    Ok(Json(state.proxy.list_models().await?))
}
