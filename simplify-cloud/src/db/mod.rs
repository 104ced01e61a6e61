//! Database access layer (PostgreSQL)

pub mod subscriptions;
pub mod usage;
