//! Error codes used across the simplify services
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Webhook authentication errors
//! - 2xxx: Quota errors
//! - 3xxx: Upstream model API errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as its `u16` value so clients can branch on it without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Body could not be parsed
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Body exceeds the size limit
    PayloadTooLarge = 8,
    /// HTTP method not supported on this route
    MethodNotAllowed = 9,
    /// Request did not complete within the request timeout
    RequestTimeout = 10,

    // ==================== 1xxx: Webhook auth ====================
    /// Signature header missing
    SignatureMissing = 1001,
    /// Signature does not match the body
    SignatureInvalid = 1002,

    // ==================== 2xxx: Quota ====================
    /// Free-tier daily quota exhausted
    QuotaExceeded = 2001,

    // ==================== 3xxx: Upstream ====================
    /// Upstream model API returned an error
    UpstreamError = 3001,
    /// Upstream model API did not answer in time
    UpstreamTimeout = 3002,
    /// A newer request from the same session replaced this one
    RequestSuperseded = 3003,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Server configuration error (missing secret or credential)
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidFormat => "Invalid JSON payload",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::PayloadTooLarge => "Payload too large",
            ErrorCode::MethodNotAllowed => "Method not allowed",
            ErrorCode::RequestTimeout => "Request timed out",

            // Webhook auth
            ErrorCode::SignatureMissing => "Missing signature",
            ErrorCode::SignatureInvalid => "Invalid signature",

            // Quota
            ErrorCode::QuotaExceeded => {
                "Free limit reached. Upgrade to Pro for unlimited use."
            }

            // Upstream
            ErrorCode::UpstreamError => "Model API error",
            ErrorCode::UpstreamTimeout => "Model API timed out",
            ErrorCode::RequestSuperseded => "Request superseded by a newer request",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Server configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::PayloadTooLarge),
            9 => Ok(ErrorCode::MethodNotAllowed),
            10 => Ok(ErrorCode::RequestTimeout),

            // Webhook auth
            1001 => Ok(ErrorCode::SignatureMissing),
            1002 => Ok(ErrorCode::SignatureInvalid),

            // Quota
            2001 => Ok(ErrorCode::QuotaExceeded),

            // Upstream
            3001 => Ok(ErrorCode::UpstreamError),
            3002 => Ok(ErrorCode::UpstreamTimeout),
            3003 => Ok(ErrorCode::RequestSuperseded),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
