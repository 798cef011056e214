//! # Entity Registry Persistence
//!
//! Dual-write target for the in-memory entity store: mutations go to both,
//! reads on the issuance path come from here (another instance may have
//! registered or deactivated the entity since hydration).

use chrono::{DateTime, Utc};
use radicar_core::DaneCode;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::state::EntityRecord;

fn row_to_record(row: &PgRow) -> Result<EntityRecord, sqlx::Error> {
    let dane_code: String = row.try_get("dane_code")?;
    let dane_code = DaneCode::new(dane_code).map_err(|err| {
        tracing::error!(error = %err, "corrupt dane_code column");
        sqlx::Error::Decode(Box::new(err))
    })?;

    let numbering_type = match row.try_get::<Option<String>, _>("numbering_type")? {
        Some(code) => Some(crate::db::decode_numbering_type(&code)?),
        None => None,
    };

    Ok(EntityRecord {
        id: row.try_get("id")?,
        dane_code,
        name: row.try_get("name")?,
        numbering_type,
        active: row.try_get("active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

/// Insert a new entity row.
pub async fn insert(pool: &PgPool, record: &EntityRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO entities (id, dane_code, name, numbering_type, active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(record.id)
    .bind(record.dane_code.as_str())
    .bind(&record.name)
    .bind(record.numbering_type.map(|nt| nt.code()))
    .bind(record.active)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Persist the mutable registry fields of an existing entity.
pub async fn update(pool: &PgPool, record: &EntityRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE entities
         SET name = $1, numbering_type = $2, active = $3, updated_at = $4
         WHERE id = $5",
    )
    .bind(&record.name)
    .bind(record.numbering_type.map(|nt| nt.code()))
    .bind(record.active)
    .bind(record.updated_at)
    .bind(record.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Fetch one entity by id.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<EntityRecord>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, dane_code, name, numbering_type, active, created_at, updated_at
         FROM entities WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_record).transpose()
}

/// Load the whole registry, for startup hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<EntityRecord>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, dane_code, name, numbering_type, active, created_at, updated_at
         FROM entities ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}
