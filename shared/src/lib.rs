//! Shared types for the simplify workspace
//!
//! Error codes, the `AppError` response type, persisted data models and the
//! request DTOs of the AI proxy. Used by both `simplify-ai` and
//! `simplify-cloud`.

pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
