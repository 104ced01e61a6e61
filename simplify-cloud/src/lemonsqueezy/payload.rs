//! Webhook event payload
//!
//! Only the fields the ingestor reads are typed. Provider ids arrive as
//! numbers or strings, so they stay loose [`Value`]s and are normalized by
//! the accessors below. Every field is read leniently: a value of the wrong
//! shape counts as absent, so any JSON body yields a payload.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a field, treating a value of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub meta: Option<Meta>,
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<Data>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "lenient")]
    pub event_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attributes {
    #[serde(default, deserialize_with = "lenient")]
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer_email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub variant_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cancelled: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub order_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub product_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub test_mode: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated_at: Option<String>,
}

/// Stringify a provider id; null, empty and non-scalar values are absent
fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl WebhookPayload {
    /// Read a payload from any JSON value; non-object bodies are empty payloads
    pub fn from_value(raw: &Value) -> Self {
        Self::deserialize(raw).unwrap_or_default()
    }

    pub fn event_name(&self) -> Option<&str> {
        self.meta
            .as_ref()?
            .event_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    pub fn subscription_id(&self) -> Option<String> {
        id_string(self.data.as_ref()?.id.as_ref())
    }

    pub fn attributes(&self) -> Attributes {
        self.data
            .as_ref()
            .and_then(|d| d.attributes.clone())
            .unwrap_or_default()
    }
}

impl Attributes {
    /// First present of `user_email`, `customer_email`, `email`
    pub fn email(&self) -> Option<&str> {
        [&self.user_email, &self.customer_email, &self.email]
            .into_iter()
            .filter_map(|e| e.as_deref())
            .find(|e| !e.trim().is_empty())
    }

    /// Variant id as a positive integer; `0` and unparseable values are absent
    pub fn variant_id(&self) -> Option<i64> {
        let id = match self.variant_id.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        id.filter(|id| *id != 0)
    }

    pub fn customer_id(&self) -> Option<String> {
        id_string(self.customer_id.as_ref())
    }

    pub fn order_id(&self) -> Option<String> {
        id_string(self.order_id.as_ref())
    }

    pub fn product_id(&self) -> Option<String> {
        id_string(self.product_id.as_ref())
    }

    /// Provider `updated_at`; unparseable timestamps count as absent
    pub fn provider_updated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.updated_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}
