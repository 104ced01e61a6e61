use chrono::NaiveDate;
use sqlx::PgPool;

/// Add one use for `(identity, day)` and return the new count
pub async fn increment(pool: &PgPool, identity: &str, day: NaiveDate) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO usage_counters (identity, day, count, updated_at)
         VALUES ($1, $2, 1, NOW())
         ON CONFLICT (identity, day) DO UPDATE SET
            count = usage_counters.count + 1,
            updated_at = NOW()
         RETURNING count",
    )
    .bind(identity)
    .bind(day)
    .fetch_one(pool)
    .await
}
