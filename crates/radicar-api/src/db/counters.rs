//! # Sequence Counter Persistence
//!
//! The durable counter store: one row per `(entity, numbering_type, year)`
//! bucket holding the `last_sequence` watermark. [`advance_and_record`] is
//! the system's single serialization point — a row-level pessimistic lock
//! (`SELECT … FOR UPDATE`) held for the read-increment-write, with the
//! filing insert in the same transaction. Two concurrent callers on the
//! same bucket serialize on the row lock; callers on different buckets
//! never contend.
//!
//! Coordination happens entirely in PostgreSQL. In-process locks cannot
//! serialize across service instances, so none are used here.

use chrono::Utc;
use radicar_core::{FilingNumber, FilingYear, NumberingType, RegisteredEntity};
use sqlx::PgPool;
use uuid::Uuid;

use crate::issuance::IssuanceError;
use crate::state::FilingRecord;

/// Atomically advance a bucket's counter and persist the filing record.
///
/// Single transaction:
/// 1. lazily create the bucket row (`ON CONFLICT DO NOTHING` against the
///    partial unique index);
/// 2. lock the active row with `FOR UPDATE`;
/// 3. increment `last_sequence`, refusing past 9999;
/// 4. insert the filing record carrying the formatted number.
///
/// Any failure rolls the whole transaction back — the counter is never
/// advanced without its filing record.
pub async fn advance_and_record(
    pool: &PgPool,
    entity: &RegisteredEntity,
    year: FilingYear,
    procedure_type: Option<String>,
    reserved_reason: Option<String>,
) -> Result<FilingRecord, IssuanceError> {
    let numbering_type = entity.numbering_type();
    let entity_id = *entity.id.as_uuid();
    let year_value = i32::from(year.value());

    let mut tx = pool.begin().await.map_err(IssuanceError::Storage)?;

    sqlx::query(
        "INSERT INTO sequence_counters
            (id, entity_id, dane_code, numbering_type, year, last_sequence, active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, 0, TRUE, NOW(), NOW())
         ON CONFLICT (entity_id, numbering_type, year) WHERE active DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(entity_id)
    .bind(entity.dane_code.as_str())
    .bind(numbering_type.code())
    .bind(year_value)
    .execute(&mut *tx)
    .await
    .map_err(IssuanceError::Storage)?;

    // The serialization point: the row lock is held until commit.
    let (counter_id, last_sequence): (Uuid, i32) = sqlx::query_as(
        "SELECT id, last_sequence FROM sequence_counters
         WHERE entity_id = $1 AND numbering_type = $2 AND year = $3 AND active
         FOR UPDATE",
    )
    .bind(entity_id)
    .bind(numbering_type.code())
    .bind(year_value)
    .fetch_one(&mut *tx)
    .await
    .map_err(IssuanceError::Storage)?;

    let next = last_sequence + 1;

    // Constructing the number is the capacity check: past 9999 the 4-digit
    // field cannot carry the sequence. Dropping the transaction rolls back
    // the lazy bucket creation too.
    let Ok(number) = FilingNumber::new(entity.dane_code.clone(), numbering_type, year, next as u32)
    else {
        return Err(IssuanceError::SequenceOverflow {
            dane_code: entity.dane_code.to_string(),
            type_code: numbering_type.code(),
            year: year.value(),
        });
    };

    sqlx::query("UPDATE sequence_counters SET last_sequence = $1, updated_at = NOW() WHERE id = $2")
        .bind(next)
        .bind(counter_id)
        .execute(&mut *tx)
        .await
        .map_err(IssuanceError::Storage)?;

    let record = FilingRecord {
        id: Uuid::new_v4(),
        entity_id,
        filing_number: number.to_string(),
        dane_code: entity.dane_code.clone(),
        numbering_type,
        year: year.value(),
        sequence: next as u32,
        procedure_type,
        reserved_reason,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO filings
            (id, entity_id, filing_number, dane_code, numbering_type, year, sequence,
             procedure_type, reserved_reason, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(record.id)
    .bind(record.entity_id)
    .bind(&record.filing_number)
    .bind(record.dane_code.as_str())
    .bind(record.numbering_type.code())
    .bind(i32::from(record.year))
    .bind(record.sequence as i32)
    .bind(&record.procedure_type)
    .bind(&record.reserved_reason)
    .bind(record.created_at)
    .execute(&mut *tx)
    .await
    .map_err(IssuanceError::Storage)?;

    tx.commit().await.map_err(IssuanceError::Storage)?;
    Ok(record)
}

/// Read a bucket's `last_sequence` watermark. `None` when the bucket has
/// never issued.
pub async fn watermark(
    pool: &PgPool,
    entity_id: Uuid,
    numbering_type: NumberingType,
    year: u16,
) -> Result<Option<u32>, sqlx::Error> {
    let value: Option<i32> = sqlx::query_scalar(
        "SELECT last_sequence FROM sequence_counters
         WHERE entity_id = $1 AND numbering_type = $2 AND year = $3 AND active",
    )
    .bind(entity_id)
    .bind(numbering_type.code())
    .bind(i32::from(year))
    .fetch_optional(pool)
    .await?;

    Ok(value.map(|v| v.max(0) as u32))
}
