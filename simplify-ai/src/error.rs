//! AI proxy error types

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// AI proxy error type
#[derive(Debug, Error)]
pub enum AiError {
    /// Request failed validation
    #[error("{0}")]
    Validation(String),

    /// Required request field is missing or blank
    #[error("{0} is required")]
    Required(&'static str),

    /// Credential or setting not configured
    #[error("Missing {0}")]
    Config(&'static str),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {status}")]
    Upstream { status: u16, body: String },

    /// Transport failure talking to the upstream
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream call exceeded its time bound
    #[error("Upstream call timed out")]
    Timeout,

    /// Superseded by a newer request of the same session
    #[error("Request superseded")]
    Cancelled,
}

impl AiError {
    /// Failures of the quality model that warrant one call to the fast model
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::Network(_) | Self::Timeout
        )
    }
}

/// Result type for AI proxy operations
pub type AiResult<T> = Result<T, AiError>;

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Validation(msg) => AppError::validation(msg),
            AiError::Required(field) => AppError::required(field),
            AiError::Config(setting) => AppError::config(setting),
            AiError::Upstream { status, body } => AppError::upstream(Some(status), body),
            AiError::Network(e) if e.is_timeout() => AppError::new(ErrorCode::UpstreamTimeout),
            AiError::Network(e) => AppError::upstream(None, e.to_string()),
            AiError::Timeout => AppError::new(ErrorCode::UpstreamTimeout),
            AiError::Cancelled => AppError::new(ErrorCode::RequestSuperseded),
        }
    }
}
