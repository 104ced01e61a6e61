//! Domain services injected into the HTTP layer

pub mod entitlement;
pub mod inflight;
pub mod webhook;

pub use entitlement::EntitlementResolver;
pub use inflight::{InflightGuard, InflightRegistry};
pub use webhook::{Ack, IgnoreReason, WebhookIngestor};
