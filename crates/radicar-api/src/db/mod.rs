//! # Database Layer
//!
//! PostgreSQL persistence for the issuance ledger and entity registry.
//! All functions take a `&PgPool` (or transaction) and speak plain SQL —
//! no ORM. The counter advance in [`counters`] is the only write path
//! that must serialize; everything else is ordinary reads and dual-writes.
//!
//! The schema is applied idempotently at startup. The partial unique
//! index on `sequence_counters` enforces "at most one active row per
//! bucket"; the unique constraint on `filings.filing_number` enforces
//! global number uniqueness as the last line of defense.

pub mod counters;
pub mod entities;
pub mod filings;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Initialize the PostgreSQL pool from `DATABASE_URL`.
///
/// Absent (or blank) variable means in-memory, single-instance mode —
/// fine for development, unsafe for horizontally scaled deployments,
/// which must coordinate through the shared durable store.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory, single-instance mode. \
                 Issued numbers will not survive a restart."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&url)
        .await?;
    ensure_schema(&pool).await?;
    tracing::info!("connected to PostgreSQL");
    Ok(Some(pool))
}

/// Apply the schema idempotently.
async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS entities (
            id UUID PRIMARY KEY,
            dane_code TEXT NOT NULL,
            name TEXT NOT NULL,
            numbering_type TEXT,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS sequence_counters (
            id UUID PRIMARY KEY,
            entity_id UUID NOT NULL REFERENCES entities(id),
            dane_code TEXT NOT NULL,
            numbering_type TEXT NOT NULL,
            year INT NOT NULL,
            last_sequence INT NOT NULL DEFAULT 0 CHECK (last_sequence >= 0),
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
        "CREATE UNIQUE INDEX IF NOT EXISTS sequence_counters_bucket_idx
            ON sequence_counters (entity_id, numbering_type, year) WHERE active",
        "CREATE TABLE IF NOT EXISTS filings (
            id UUID PRIMARY KEY,
            entity_id UUID NOT NULL REFERENCES entities(id),
            filing_number TEXT NOT NULL UNIQUE,
            dane_code TEXT NOT NULL,
            numbering_type TEXT NOT NULL,
            year INT NOT NULL,
            sequence INT NOT NULL,
            procedure_type TEXT,
            reserved_reason TEXT,
            created_at TIMESTAMPTZ NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS filings_bucket_idx
            ON filings (entity_id, numbering_type, year)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Decode a stored numbering wire code, surfacing corruption as a decode
/// error instead of defaulting.
pub(crate) fn decode_numbering_type(
    code: &str,
) -> Result<radicar_core::NumberingType, sqlx::Error> {
    radicar_core::NumberingType::from_code(code).map_err(|err| {
        tracing::error!(code, "corrupt numbering_type column");
        sqlx::Error::Decode(Box::new(err))
    })
}
