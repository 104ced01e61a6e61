//! Unified error system for the simplify services
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for every failure the API can report
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with code, message, details and HTTP mapping
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors (validation, malformed input, routing)
//! - 1xxx: Webhook authentication errors
//! - 2xxx: Quota errors
//! - 3xxx: Upstream model API errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::SignatureInvalid);
//! assert_eq!(err.http_status(), http::StatusCode::UNAUTHORIZED);
//!
//! let err = AppError::validation("Email is required").with_detail("field", "email");
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
