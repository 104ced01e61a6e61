//! Subscription Model
//!
//! Latest known state of one payment-provider subscription, one row per
//! `subscription_id`. Rows are written only by webhook ingestion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Statuses that grant Pro access (unless the subscription is cancelled)
pub const ENTITLED_STATUSES: [&str; 3] = ["active", "on_trial", "trialing"];

/// Event-name prefix of the subscription event family
pub const SUBSCRIPTION_EVENT_PREFIX: &str = "subscription_";

/// Pro determination: not cancelled and in an entitled status
pub fn is_pro_status(status: Option<&str>, cancelled: bool) -> bool {
    if cancelled {
        return false;
    }
    status.is_some_and(|s| ENTITLED_STATUSES.contains(&s))
}

/// Subscription row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_id: String,
    pub email: Option<String>,
    pub variant_id: Option<i64>,
    pub status: Option<String>,
    pub cancelled: bool,
    pub customer_id: Option<String>,
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    pub test_mode: bool,
    pub last_event: String,
    /// Write time of the last accepted event
    pub last_event_at: DateTime<Utc>,
    /// Write time of the last accepted event
    pub updated_at: DateTime<Utc>,
    /// Provider-declared `updated_at` of the last accepted event
    pub provider_updated_at: Option<DateTime<Utc>>,
    /// Full last-seen payload
    pub raw: Value,
}

impl Subscription {
    pub fn is_pro(&self) -> bool {
        is_pro_status(self.status.as_deref(), self.cancelled)
    }
}

/// Merge-upsert payload built from one accepted webhook event
#[derive(Debug, Clone)]
pub struct UpsertSubscription<'a> {
    pub subscription_id: &'a str,
    pub email: Option<&'a str>,
    pub variant_id: Option<i64>,
    pub status: Option<&'a str>,
    pub cancelled: bool,
    pub customer_id: Option<&'a str>,
    pub order_id: Option<&'a str>,
    pub product_id: Option<&'a str>,
    pub test_mode: bool,
    pub last_event: &'a str,
    pub provider_updated_at: Option<DateTime<Utc>>,
    pub raw: &'a Value,
}

impl UpsertSubscription<'_> {
    /// Ordering guard: an event older than the stored one (by provider time)
    /// must not overwrite it. Events lacking a provider time always apply.
    pub fn supersedes(&self, existing: &Subscription) -> bool {
        match (self.provider_updated_at, existing.provider_updated_at) {
            (Some(incoming), Some(stored)) => incoming >= stored,
            _ => true,
        }
    }

    /// Materialize the row as it looks after being written at `now`
    pub fn to_row(&self, now: DateTime<Utc>) -> Subscription {
        Subscription {
            subscription_id: self.subscription_id.to_owned(),
            email: self.email.map(str::to_owned),
            variant_id: self.variant_id,
            status: self.status.map(str::to_owned),
            cancelled: self.cancelled,
            customer_id: self.customer_id.map(str::to_owned),
            order_id: self.order_id.map(str::to_owned),
            product_id: self.product_id.map(str::to_owned),
            test_mode: self.test_mode,
            last_event: self.last_event.to_owned(),
            last_event_at: now,
            updated_at: now,
            provider_updated_at: self.provider_updated_at,
            raw: self.raw.clone(),
        }
    }
}

/// Result of a merge-upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Row inserted or overwritten
    Applied,
    /// Stored row is newer by provider time, left untouched
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn upsert<'a>(raw: &'a Value, provider_updated_at: Option<DateTime<Utc>>) -> UpsertSubscription<'a> {
        UpsertSubscription {
            subscription_id: "sub_1",
            email: Some("ada@example.com"),
            variant_id: Some(42),
            status: Some("active"),
            cancelled: false,
            customer_id: Some("7"),
            order_id: None,
            product_id: None,
            test_mode: true,
            last_event: "subscription_updated",
            provider_updated_at,
            raw,
        }
    }

    #[test]
    fn test_is_pro_truth_table() {
        assert!(is_pro_status(Some("active"), false));
        assert!(!is_pro_status(Some("active"), true));
        assert!(is_pro_status(Some("on_trial"), false));
        assert!(is_pro_status(Some("trialing"), false));
        assert!(!is_pro_status(Some("past_due"), false));
        assert!(!is_pro_status(Some("expired"), false));
        assert!(!is_pro_status(None, false));
    }

    #[test]
    fn test_to_row_stamps_write_time() {
        let raw = serde_json::json!({ "meta": {} });
        let now = Utc::now();
        let row = upsert(&raw, None).to_row(now);
        assert_eq!(row.subscription_id, "sub_1");
        assert_eq!(row.last_event_at, now);
        assert_eq!(row.updated_at, now);
        assert!(row.is_pro());
        assert_eq!(row.raw, raw);
    }

    #[test]
    fn test_supersedes_by_provider_time() {
        let raw = Value::Null;
        let t0 = Utc::now();
        let stored = upsert(&raw, Some(t0)).to_row(t0);

        assert!(upsert(&raw, Some(t0)).supersedes(&stored));
        assert!(upsert(&raw, Some(t0 + Duration::seconds(1))).supersedes(&stored));
        assert!(!upsert(&raw, Some(t0 - Duration::seconds(1))).supersedes(&stored));
        assert!(upsert(&raw, None).supersedes(&stored));
    }

    #[test]
    fn test_serialize_camel_case() {
        let raw = Value::Null;
        let json = serde_json::to_value(upsert(&raw, None).to_row(Utc::now())).unwrap();
        assert_eq!(json["subscriptionId"], "sub_1");
        assert_eq!(json["lastEvent"], "subscription_updated");
        assert_eq!(json["testMode"], true);
    }
}
