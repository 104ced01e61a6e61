use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{Subscription, UpsertOutcome, UpsertSubscription};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::{Store, StoreResult};
use crate::db;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and apply pending migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;
        tracing::info!(max_connections, "Connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_subscription(&self, sub: &UpsertSubscription<'_>) -> StoreResult<UpsertOutcome> {
        Ok(db::subscriptions::upsert(&self.pool, sub).await?)
    }

    async fn latest_subscription(
        &self,
        email: &str,
        variant_id: Option<i64>,
    ) -> StoreResult<Option<Subscription>> {
        Ok(db::subscriptions::find_latest_by_email(&self.pool, email, variant_id).await?)
    }

    async fn increment_usage(&self, identity: &str, day: NaiveDate) -> StoreResult<i32> {
        Ok(db::usage::increment(&self.pool, identity, day).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}
