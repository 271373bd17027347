use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

/// Current value of a usage counter; 0 when the subject has none yet.
pub async fn get_usage_count(pool: &PgPool, subject_key: &str) -> Result<i64> {
    let count: Option<i64> =
        sqlx::query_scalar("SELECT count FROM usage_counters WHERE subject_key = $1")
            .bind(subject_key)
            .fetch_optional(pool)
            .await?;
    Ok(count.unwrap_or(0))
}

/// Increment-or-create in one statement; returns the new count.
pub async fn increment_usage(pool: &PgPool, subject_key: &str) -> Result<i64> {
    Ok(sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO usage_counters (subject_key, count, updated_at)
        VALUES ($1, 1, NOW())
        ON CONFLICT (subject_key)
        DO UPDATE SET count = usage_counters.count + 1, updated_at = NOW()
        RETURNING count
        "#,
    )
    .bind(subject_key)
    .fetch_one(pool)
    .await?)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub count: i64,
    /// `None` for signed-in users, who are not trial limited.
    pub limit: Option<i64>,
    pub remaining: Option<i64>,
}

impl UsageSummary {
    pub fn new(count: i64, limit: Option<i64>) -> Self {
        Self {
            count,
            limit,
            remaining: limit.map(|l| (l - count).max(0)),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}
