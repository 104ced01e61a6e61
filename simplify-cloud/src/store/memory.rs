use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shared::models::{Subscription, UpsertOutcome, UpsertSubscription};

use super::{Store, StoreResult};

/// In-process store for local development and tests
///
/// Each operation holds the shard lock of its key, which gives the same
/// per-row atomicity as the SQL statements of [`super::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    subscriptions: DashMap<String, Subscription>,
    usage: DashMap<(String, NaiveDate), i32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_subscription(&self, sub: &UpsertSubscription<'_>) -> StoreResult<UpsertOutcome> {
        let now = Utc::now();
        match self.subscriptions.entry(sub.subscription_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if !sub.supersedes(entry.get()) {
                    return Ok(UpsertOutcome::Stale);
                }
                entry.insert(sub.to_row(now));
            }
            Entry::Vacant(entry) => {
                entry.insert(sub.to_row(now));
            }
        }
        Ok(UpsertOutcome::Applied)
    }

    async fn latest_subscription(
        &self,
        email: &str,
        variant_id: Option<i64>,
    ) -> StoreResult<Option<Subscription>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| r.email.as_deref() == Some(email))
            .filter(|r| variant_id.is_none() || r.variant_id == variant_id)
            .max_by_key(|r| (r.updated_at, r.last_event_at))
            .map(|r| r.value().clone()))
    }

    async fn increment_usage(&self, identity: &str, day: NaiveDate) -> StoreResult<i32> {
        let mut count = self.usage.entry((identity.to_string(), day)).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}
