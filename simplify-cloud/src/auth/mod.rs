//! Caller identification and free-tier quota

pub mod quota;

pub use quota::{UsageLimiter, client_identity};
