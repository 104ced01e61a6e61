//! simplify-cloud: subscription-gated text simplification service
//!
//! - Ingests Lemon Squeezy subscription webhooks (HMAC-verified)
//! - Answers Pro entitlement checks by email
//! - Proxies rewriting tasks to the Gemini API, metering free callers per day

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod lemonsqueezy;
pub mod services;
pub mod state;
pub mod store;

pub use config::Config;
pub use state::AppState;
