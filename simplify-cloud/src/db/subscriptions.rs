use shared::models::{Subscription, UpsertOutcome, UpsertSubscription};
use sqlx::PgPool;

const COLUMNS: &str = "subscription_id, email, variant_id, status, cancelled, customer_id,
    order_id, product_id, test_mode, last_event, last_event_at, updated_at,
    provider_updated_at, raw";

/// Merge-upsert keyed by `subscription_id`
///
/// The `WHERE` clause of the update arm is the ordering guard: a stored row
/// whose provider timestamp is newer than the incoming one is left as-is and
/// no row is affected.
pub async fn upsert(pool: &PgPool, sub: &UpsertSubscription<'_>) -> Result<UpsertOutcome, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO subscriptions (
            subscription_id, email, variant_id, status, cancelled, customer_id,
            order_id, product_id, test_mode, last_event, last_event_at, updated_at,
            provider_updated_at, raw
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW(), $11, $12)
         ON CONFLICT (subscription_id) DO UPDATE SET
            email = EXCLUDED.email,
            variant_id = EXCLUDED.variant_id,
            status = EXCLUDED.status,
            cancelled = EXCLUDED.cancelled,
            customer_id = EXCLUDED.customer_id,
            order_id = EXCLUDED.order_id,
            product_id = EXCLUDED.product_id,
            test_mode = EXCLUDED.test_mode,
            last_event = EXCLUDED.last_event,
            last_event_at = NOW(),
            updated_at = NOW(),
            provider_updated_at = EXCLUDED.provider_updated_at,
            raw = EXCLUDED.raw
         WHERE subscriptions.provider_updated_at IS NULL
            OR EXCLUDED.provider_updated_at IS NULL
            OR EXCLUDED.provider_updated_at >= subscriptions.provider_updated_at",
    )
    .bind(sub.subscription_id)
    .bind(sub.email)
    .bind(sub.variant_id)
    .bind(sub.status)
    .bind(sub.cancelled)
    .bind(sub.customer_id)
    .bind(sub.order_id)
    .bind(sub.product_id)
    .bind(sub.test_mode)
    .bind(sub.last_event)
    .bind(sub.provider_updated_at)
    .bind(sub.raw)
    .execute(pool)
    .await?;

    Ok(if result.rows_affected() == 0 {
        UpsertOutcome::Stale
    } else {
        UpsertOutcome::Applied
    })
}

/// Most recently written row for an email, optionally restricted to a variant
pub async fn find_latest_by_email(
    pool: &PgPool,
    email: &str,
    variant_id: Option<i64>,
) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        "SELECT {COLUMNS} FROM subscriptions
         WHERE email = $1 AND ($2::BIGINT IS NULL OR variant_id = $2)
         ORDER BY updated_at DESC NULLS LAST, last_event_at DESC
         LIMIT 1"
    ))
    .bind(email)
    .bind(variant_id)
    .fetch_optional(pool)
    .await
}
