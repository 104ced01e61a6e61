//! Entitlement result of the Pro status check

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subscription::Subscription;

/// Derived Pro access for one email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub is_pro: bool,
    pub status: Option<String>,
    pub last_event: Option<String>,
    pub last_event_at: Option<DateTime<Utc>>,
}

impl Entitlement {
    /// Not Pro, no backing record
    pub fn none() -> Self {
        Self {
            is_pro: false,
            status: None,
            last_event: None,
            last_event_at: None,
        }
    }

    pub fn from_record(record: Option<&Subscription>) -> Self {
        match record {
            Some(sub) => Self {
                is_pro: sub.is_pro(),
                status: sub.status.clone(),
                last_event: Some(sub.last_event.clone()),
                last_event_at: Some(sub.last_event_at),
            },
            None => Self::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_serializes_nulls() {
        let json = serde_json::to_value(Entitlement::none()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isPro": false,
                "status": null,
                "lastEvent": null,
                "lastEventAt": null
            })
        );
    }
}
