//! Pro status endpoint
//!
//! GET /api/pro-status?email=… and POST /api/pro-status {"email": …}

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::{Entitlement, normalize_email};

use super::parse_json;
use crate::error::ServiceError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EmailParams {
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn pro_status_query(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> Result<Json<Entitlement>, ServiceError> {
    resolve(&state, params.email.as_deref()).await
}

pub async fn pro_status_body(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Entitlement>, ServiceError> {
    let params: EmailParams = parse_json(&body)?;
    resolve(&state, params.email.as_deref()).await
}

async fn resolve(state: &AppState, email: Option<&str>) -> Result<Json<Entitlement>, ServiceError> {
    let email = email
        .and_then(normalize_email)
        .ok_or_else(|| AppError::required("email"))?;
    let entitlement = state.entitlements.resolve(Some(&email)).await?;
    Ok(Json(entitlement))
}
