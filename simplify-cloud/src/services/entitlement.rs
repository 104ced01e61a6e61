//! Entitlement Resolver

use shared::models::{Entitlement, normalize_email};
use std::sync::Arc;

use crate::error::ServiceResult;
use crate::store::Store;

#[derive(Clone)]
pub struct EntitlementResolver {
    store: Arc<dyn Store>,
    target_variant_id: Option<i64>,
}

impl EntitlementResolver {
    pub fn new(store: Arc<dyn Store>, target_variant_id: Option<i64>) -> Self {
        Self {
            store,
            target_variant_id,
        }
    }

    /// Pro status for an email. No (or blank) email is never Pro and skips
    /// the store.
    pub async fn resolve(&self, email: Option<&str>) -> ServiceResult<Entitlement> {
        let Some(email) = email.and_then(normalize_email) else {
            return Ok(Entitlement::none());
        };

        let record = self
            .store
            .latest_subscription(&email, self.target_variant_id)
            .await?;
        Ok(Entitlement::from_record(record.as_ref()))
    }
}
