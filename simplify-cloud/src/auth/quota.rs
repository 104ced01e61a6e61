//! Usage Limiter
//!
//! Free-tier accounting for callers without a Pro entitlement. The counter is
//! incremented first and checked after, in one atomic store operation, so
//! concurrent requests can never both take the last free use.

use axum::http::HeaderMap;
use chrono::{NaiveDate, Utc};
use shared::error::AppError;
use shared::models::{Identity, QuotaUsage};
use std::sync::Arc;

use crate::error::ServiceResult;
use crate::store::Store;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Quota identity of a caller: email if known, else the first
/// `X-Forwarded-For` entry, else `unknown`
pub fn client_identity(email: Option<&str>, headers: &HeaderMap) -> Identity {
    let forwarded = headers.get(FORWARDED_FOR).and_then(|v| v.to_str().ok());
    Identity::resolve(email, forwarded)
}

#[derive(Clone)]
pub struct UsageLimiter {
    store: Arc<dyn Store>,
    daily_limit: i32,
}

impl UsageLimiter {
    pub fn new(store: Arc<dyn Store>, daily_limit: i32) -> Self {
        Self { store, daily_limit }
    }

    pub fn daily_limit(&self) -> i32 {
        self.daily_limit
    }

    /// Current UTC day
    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Consume one free use. The attempt is recorded even when refused.
    pub async fn try_consume(&self, identity: &Identity, day: NaiveDate) -> ServiceResult<QuotaUsage> {
        let key = identity.to_string();
        let count = self.store.increment_usage(&key, day).await?;

        if count > self.daily_limit {
            tracing::info!(identity = %key, count, limit = self.daily_limit, "Free limit reached");
            return Err(AppError::quota_exceeded().into());
        }

        tracing::debug!(identity = %key, count, "Free use consumed");
        Ok(QuotaUsage {
            count,
            limit: self.daily_limit,
        })
    }
}
