//! Data models
//!
//! Persisted row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Timestamps are `DateTime<Utc>` (Postgres TIMESTAMPTZ).

pub mod entitlement;
pub mod simplify;
pub mod subscription;
pub mod usage;

// Re-exports
pub use entitlement::*;
pub use simplify::*;
pub use subscription::*;
pub use usage::*;

/// Trim and lower-case an email; blank input yields `None`
pub fn normalize_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
