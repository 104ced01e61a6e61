//! Webhook Ingestor
//!
//! Reconciles subscription state from verified Lemon Squeezy events. Delivery
//! is at-least-once and unordered: every accepted event is one idempotent
//! merge-upsert, and the store's ordering guard drops events older than the
//! stored state.

use serde_json::Value;
use shared::models::{SUBSCRIPTION_EVENT_PREFIX, UpsertOutcome, UpsertSubscription, normalize_email};
use std::fmt;
use std::sync::Arc;

use crate::error::ServiceResult;
use crate::lemonsqueezy::WebhookPayload;
use crate::store::Store;

/// Why an event was acknowledged without a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    MissingEventName,
    MissingData,
    VariantMismatch,
    UnhandledEvent,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IgnoreReason::MissingEventName => "missing event name",
            IgnoreReason::MissingData => "missing data or id",
            IgnoreReason::VariantMismatch => "variant mismatch",
            IgnoreReason::UnhandledEvent => "unhandled event family",
        })
    }
}

/// Ingestion outcome; every variant is acknowledged to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Stored,
    /// Stored row is newer than this event
    Stale,
    Ignored(IgnoreReason),
}

#[derive(Clone)]
pub struct WebhookIngestor {
    store: Arc<dyn Store>,
    target_variant_id: Option<i64>,
}

impl WebhookIngestor {
    pub fn new(store: Arc<dyn Store>, target_variant_id: Option<i64>) -> Self {
        Self {
            store,
            target_variant_id,
        }
    }

    /// Apply one verified event. `raw` is stored verbatim for audit.
    pub async fn ingest(&self, payload: &WebhookPayload, raw: &Value) -> ServiceResult<Ack> {
        let Some(event_name) = payload.event_name() else {
            return Ok(Ack::Ignored(IgnoreReason::MissingEventName));
        };
        let Some(subscription_id) = payload.subscription_id() else {
            return Ok(Ack::Ignored(IgnoreReason::MissingData));
        };

        let attrs = payload.attributes();
        let payload_variant = attrs.variant_id();
        if let (Some(target), Some(variant)) = (self.target_variant_id, payload_variant)
            && target != variant
        {
            tracing::debug!(event_name, variant, target, "Ignoring event for another variant");
            return Ok(Ack::Ignored(IgnoreReason::VariantMismatch));
        }

        if !event_name.starts_with(SUBSCRIPTION_EVENT_PREFIX) {
            return Ok(Ack::Ignored(IgnoreReason::UnhandledEvent));
        }

        let email = attrs.email().and_then(normalize_email);
        let customer_id = attrs.customer_id();
        let order_id = attrs.order_id();
        let product_id = attrs.product_id();

        let upsert = UpsertSubscription {
            subscription_id: &subscription_id,
            email: email.as_deref(),
            variant_id: payload_variant.or(self.target_variant_id),
            status: attrs.status.as_deref(),
            cancelled: attrs.cancelled.unwrap_or(false),
            customer_id: customer_id.as_deref(),
            order_id: order_id.as_deref(),
            product_id: product_id.as_deref(),
            test_mode: attrs.test_mode.unwrap_or(false),
            last_event: event_name,
            provider_updated_at: attrs.provider_updated_at(),
            raw,
        };

        let ack = match self.store.upsert_subscription(&upsert).await? {
            UpsertOutcome::Applied => Ack::Stored,
            UpsertOutcome::Stale => Ack::Stale,
        };

        tracing::info!(
            event_name,
            subscription_id = %subscription_id,
            status = upsert.status.unwrap_or("-"),
            ?ack,
            "Subscription event processed"
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn ingestor(variant: Option<i64>) -> (WebhookIngestor, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (WebhookIngestor::new(store.clone(), variant), store)
    }

    async fn ingest(ingestor: &WebhookIngestor, body: Value) -> Ack {
        let payload = WebhookPayload::from_value(&body);
        ingestor.ingest(&payload, &body).await.unwrap()
    }

    fn event(name: &str, status: &str, updated_at: &str) -> Value {
        json!({
            "meta": { "event_name": name },
            "data": {
                "id": 99,
                "attributes": {
                    "customer_email": "Ada@Example.com",
                    "variant_id": 42,
                    "status": status,
                    "cancelled": false,
                    "product_id": 5,
                    "test_mode": true,
                    "updated_at": updated_at
                }
            }
        })
    }

    #[tokio::test]
    async fn test_duplicate_delivery_is_idempotent() {
        let (ingestor, store) = ingestor(None);
        let body = event("subscription_created", "active", "2024-01-01T00:00:00Z");

        assert_eq!(ingest(&ingestor, body.clone()).await, Ack::Stored);
        assert_eq!(ingest(&ingestor, body.clone()).await, Ack::Stored);

        assert_eq!(store.subscription_count(), 1);
        let row = store.latest_subscription("ada@example.com", None).await.unwrap().unwrap();
        assert_eq!(row.subscription_id, "99");
        assert_eq!(row.variant_id, Some(42));
        assert_eq!(row.product_id.as_deref(), Some("5"));
        assert!(row.test_mode);
        assert_eq!(row.last_event, "subscription_created");
        assert_eq!(row.raw, body);
    }

    #[tokio::test]
    async fn test_out_of_order_event_is_stale() {
        let (ingestor, store) = ingestor(None);
        ingest(&ingestor, event("subscription_cancelled", "cancelled", "2024-02-01T00:00:00Z")).await;
        let ack = ingest(&ingestor, event("subscription_updated", "active", "2024-01-01T00:00:00Z")).await;

        assert_eq!(ack, Ack::Stale);
        let row = store.latest_subscription("ada@example.com", None).await.unwrap().unwrap();
        assert_eq!(row.status.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn test_ignored_events() {
        let (ingestor, store) = ingestor(Some(7));

        let ack = ingest(&ingestor, json!({ "data": { "id": 1 } })).await;
        assert_eq!(ack, Ack::Ignored(IgnoreReason::MissingEventName));

        let ack = ingest(&ingestor, json!({ "meta": { "event_name": "subscription_created" } })).await;
        assert_eq!(ack, Ack::Ignored(IgnoreReason::MissingData));

        let ack = ingest(&ingestor, event("subscription_created", "active", "2024-01-01T00:00:00Z")).await;
        assert_eq!(ack, Ack::Ignored(IgnoreReason::VariantMismatch));

        let ack = ingest(
            &ingestor,
            json!({ "meta": { "event_name": "order_created" }, "data": { "id": 3, "attributes": {} } }),
        )
        .await;
        assert_eq!(ack, Ack::Ignored(IgnoreReason::UnhandledEvent));

        assert_eq!(store.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_variant_falls_back_to_target() {
        let (ingestor, store) = ingestor(Some(7));
        let body = json!({
            "meta": { "event_name": "subscription_payment_success" },
            "data": { "id": "s-1", "attributes": { "user_email": "x@y.z", "status": "active" } }
        });
        assert_eq!(ingest(&ingestor, body).await, Ack::Stored);
        let row = store.latest_subscription("x@y.z", None).await.unwrap().unwrap();
        assert_eq!(row.variant_id, Some(7));
        assert!(row.is_pro());
    }
}
