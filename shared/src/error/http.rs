//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,

            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,

            // 401 Unauthorized
            Self::SignatureMissing | Self::SignatureInvalid => StatusCode::UNAUTHORIZED,

            // 429 Too Many Requests
            Self::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,

            // Upstream failures without a usable upstream status
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::RequestSuperseded => StatusCode::CONFLICT,

            // 500 Internal Server Error
            Self::DatabaseError | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationFailed | Self::InvalidFormat | Self::RequiredField => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}
