//! Persistent store
//!
//! Every component reaches subscriptions and usage counters through the
//! [`Store`] trait. Each mutation is one atomic operation, so no lock is held
//! across callers.
//!
//! | Impl | Backing | Selected by |
//! |------|---------|-------------|
//! | [`PgStore`] | PostgreSQL (sqlx) | `DATABASE_URL=postgres://…` |
//! | [`MemoryStore`] | dashmap | `DATABASE_URL=memory://` |

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{Subscription, UpsertOutcome, UpsertSubscription};
use std::sync::Arc;
use thiserror::Error;

/// URL scheme selecting the in-process store
pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or merge-update one subscription by `subscription_id`
    async fn upsert_subscription(&self, sub: &UpsertSubscription<'_>) -> StoreResult<UpsertOutcome>;

    /// Latest row for a normalized email, filtered by variant when given
    async fn latest_subscription(
        &self,
        email: &str,
        variant_id: Option<i64>,
    ) -> StoreResult<Option<Subscription>>;

    /// Atomically add one use and return the new count
    async fn increment_usage(&self, identity: &str, day: NaiveDate) -> StoreResult<i32>;

    /// Reachability check
    async fn ping(&self) -> StoreResult<()>;

    /// Release connections
    async fn close(&self);
}

/// Open the store named by a database URL
pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Arc<dyn Store>> {
    if database_url.starts_with(MEMORY_URL_SCHEME) {
        tracing::warn!("Using in-memory store, data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(PgStore::connect(database_url, max_connections).await?))
}
