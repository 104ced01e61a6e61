//! Error types and the JSON error body

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Application error with structured error code and details
///
/// The primary error type of the HTTP layer, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details for debugging
/// - An optional status override, used to forward the upstream model API's
///   status code unchanged
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field names, upstream body, ...)
    pub details: Option<Value>,
    /// Replaces the code's default HTTP status when set
    pub status: Option<StatusCode>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
            status: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            status: None,
        }
    }

    /// Add a keyed detail entry, turning `details` into an object
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = match self.details.take() {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        map.insert(key.into(), value.into());
        self.details = Some(Value::Object(map));
        self
    }

    /// Replace `details` with a raw value
    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Override the HTTP status derived from the error code
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.status.unwrap_or_else(|| self.code.http_status())
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a required-field error naming the field
    pub fn required(field: &str) -> Self {
        Self::with_message(ErrorCode::RequiredField, format!("{field} is required"))
            .with_detail("field", field)
    }

    /// Create a malformed-body error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat).with_detail("reason", reason.into())
    }

    /// Create a method-not-allowed error
    pub fn method_not_allowed() -> Self {
        Self::new(ErrorCode::MethodNotAllowed)
    }

    /// Create a configuration error naming the missing setting
    pub fn config(setting: &str) -> Self {
        Self::with_message(ErrorCode::ConfigError, format!("Missing {setting}"))
    }

    /// Create a quota-exceeded error
    pub fn quota_exceeded() -> Self {
        Self::new(ErrorCode::QuotaExceeded)
    }

    /// Create an upstream error carrying the upstream status and raw body
    ///
    /// Statuses that are not errors (or not valid HTTP) fall back to 502.
    pub fn upstream(status: Option<u16>, body: impl Into<String>) -> Self {
        let err = Self::new(ErrorCode::UpstreamError).with_details(body.into());
        match status
            .and_then(|s| StatusCode::from_u16(s).ok())
            .filter(|s| s.is_client_error() || s.is_server_error())
        {
            Some(status) => err.with_status(status),
            None => err,
        }
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }
}

/// JSON body returned for every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short human-readable error string
    pub error: String,
    /// Numeric [`ErrorCode`]
    pub code: u16,
    /// Additional details, where applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.message.clone(),
            code: err.code.code(),
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ErrorBody::from(&self);

        // Log system errors
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}
