//! # Filing Read-Side Queries
//!
//! Reads over the `filings` table for validation and audit. The insert
//! lives in `db::counters::advance_and_record` — a filing row only ever
//! appears inside the transaction that advanced its counter.

use radicar_core::NumberingType;
use sqlx::PgPool;
use uuid::Uuid;

/// Whether a filing already carries `number`. Authoritative read.
pub async fn exists(pool: &PgPool, number: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM filings WHERE filing_number = $1)")
        .bind(number)
        .fetch_one(pool)
        .await
}

/// Sequence components of every filing in a bucket, duplicates included,
/// ascending. Feeds the gap/duplicate detector.
pub async fn sequences(
    pool: &PgPool,
    entity_id: Uuid,
    numbering_type: NumberingType,
    year: u16,
) -> Result<Vec<u32>, sqlx::Error> {
    let rows: Vec<i32> = sqlx::query_scalar(
        "SELECT sequence FROM filings
         WHERE entity_id = $1 AND numbering_type = $2 AND year = $3
         ORDER BY sequence ASC",
    )
    .bind(entity_id)
    .bind(numbering_type.code())
    .bind(i32::from(year))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|v| v.max(0) as u32).collect())
}
