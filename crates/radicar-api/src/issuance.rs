//! # Issuance Service
//!
//! Orchestrates official filing-number issuance: entity lookup and
//! activity check → numbering classification → atomic counter advance →
//! formatting → filing-record persistence. The counter advance and the
//! filing record commit together or not at all; a counter value is never
//! "burned" without its filing record, so the dense sequence survives
//! persistence failures.
//!
//! ## Reservation
//!
//! [`reserve`] allocates a number before the full procedure payload is
//! available, recording an audit reason instead of a procedure binding.
//! A reserved number is never released back into the pool — release would
//! reopen the door to reuse, which the legal sequence forbids.
//!
//! ## Contention
//!
//! Only lock-contention/serialization failures are retried, a bounded
//! number of times with doubling backoff. Every other failure surfaces
//! immediately and aborts procedure creation.

use std::time::Duration;

use radicar_core::FilingYear;
use thiserror::Error;
use uuid::Uuid;

use crate::db;
use crate::state::{AppState, FilingRecord};

/// Retry budget for counter contention.
const MAX_ATTEMPTS: u32 = 3;
/// Base delay for the doubling backoff.
const BASE_BACKOFF: Duration = Duration::from_millis(25);

/// Hard failures of the issuance path. Each aborts procedure creation —
/// the filing number is a precondition for the record's existence.
#[derive(Error, Debug)]
pub enum IssuanceError {
    /// The entity is not registered.
    #[error("entity {0} not found")]
    NotFound(Uuid),

    /// The entity is registered but not allowed to file.
    #[error("entity {0} is inactive and cannot be assigned filing numbers")]
    EntityInactive(Uuid),

    /// The bucket has exhausted the 4-digit sequence field.
    #[error("sequence capacity exhausted for {dane_code}-{type_code}-{year}: the 4-digit field ends at 9999")]
    SequenceOverflow {
        /// Municipality code of the exhausted bucket.
        dane_code: String,
        /// Numbering wire code of the exhausted bucket.
        type_code: &'static str,
        /// Filing year of the exhausted bucket.
        year: u16,
    },

    /// Counter contention persisted through the whole retry budget.
    #[error("counter contention persisted after {attempts} attempts; retry later")]
    Contention {
        /// How many attempts were made.
        attempts: u32,
    },

    /// Storage failure outside the retryable class.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// What the allocated number is bound to.
#[derive(Debug, Clone)]
pub enum FilingBinding {
    /// A regular filing, optionally tagged with the procedure type.
    Procedure {
        /// Procedure type identifier from the intake request.
        procedure_type: Option<String>,
    },
    /// A reservation made before the procedure payload exists.
    Reservation {
        /// Audit reason for allocating ahead of intake.
        reason: String,
    },
}

impl FilingBinding {
    fn procedure_type(&self) -> Option<String> {
        match self {
            Self::Procedure { procedure_type } => procedure_type.clone(),
            Self::Reservation { .. } => None,
        }
    }

    fn reserved_reason(&self) -> Option<String> {
        match self {
            Self::Procedure { .. } => None,
            Self::Reservation { reason } => Some(reason.clone()),
        }
    }
}

/// Issue the next filing number for an entity and bind it to a procedure.
pub async fn issue(
    state: &AppState,
    entity_id: Uuid,
    procedure_type: Option<String>,
) -> Result<FilingRecord, IssuanceError> {
    allocate(state, entity_id, FilingBinding::Procedure { procedure_type }).await
}

/// Reserve the next filing number for an entity with an audit reason.
pub async fn reserve(
    state: &AppState,
    entity_id: Uuid,
    reason: String,
) -> Result<FilingRecord, IssuanceError> {
    allocate(state, entity_id, FilingBinding::Reservation { reason }).await
}

async fn allocate(
    state: &AppState,
    entity_id: Uuid,
    binding: FilingBinding,
) -> Result<FilingRecord, IssuanceError> {
    let entity = state
        .fetch_entity(entity_id)
        .await?
        .ok_or(IssuanceError::NotFound(entity_id))?;
    if !entity.active {
        return Err(IssuanceError::EntityInactive(entity_id));
    }

    let registered = entity.registered();
    let year = FilingYear::current();

    let record = match &state.db_pool {
        Some(pool) => allocate_durable(pool, &registered, year, &binding).await?,
        None => state.ledger.issue(
            &registered,
            year,
            binding.procedure_type(),
            binding.reserved_reason(),
        )?,
    };

    tracing::info!(
        filing_number = %record.filing_number,
        entity_id = %entity_id,
        reserved = record.reserved_reason.is_some(),
        "filing number issued"
    );
    Ok(record)
}

/// Durable allocation with bounded retry on lock contention.
async fn allocate_durable(
    pool: &sqlx::PgPool,
    entity: &radicar_core::RegisteredEntity,
    year: FilingYear,
    binding: &FilingBinding,
) -> Result<FilingRecord, IssuanceError> {
    let mut attempt = 1;
    loop {
        match db::counters::advance_and_record(
            pool,
            entity,
            year,
            binding.procedure_type(),
            binding.reserved_reason(),
        )
        .await
        {
            Err(IssuanceError::Storage(err)) if is_retryable(&err) => {
                if attempt >= MAX_ATTEMPTS {
                    tracing::warn!(
                        entity_id = %entity.id,
                        attempts = attempt,
                        "counter contention exhausted retry budget"
                    );
                    return Err(IssuanceError::Contention { attempts: attempt });
                }
                let delay = BASE_BACKOFF * 2u32.pow(attempt - 1);
                tracing::debug!(
                    entity_id = %entity.id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "counter contention, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Whether a storage error is in the transient serialization/lock class.
///
/// PostgreSQL: `40001` serialization_failure, `40P01` deadlock_detected,
/// `55P03` lock_not_available.
fn is_retryable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some("40001") | Some("40P01") | Some("55P03")
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use radicar_core::{DaneCode, NumberingType};

    use crate::state::EntityRecord;

    fn register(state: &AppState, active: bool, numbering_type: NumberingType) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        state.entities.insert(
            id,
            EntityRecord {
                id,
                dane_code: DaneCode::new("11001").unwrap(),
                name: "Secretaría de Planeación".to_string(),
                numbering_type: Some(numbering_type),
                active,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    #[tokio::test]
    async fn issue_assigns_first_and_second_sequences() {
        let state = AppState::new();
        let entity_id = register(&state, true, NumberingType::Secretaria);

        let first = issue(&state, entity_id, Some("construction-permit".to_string()))
            .await
            .unwrap();
        let second = issue(&state, entity_id, None).await.unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(first.procedure_type.as_deref(), Some("construction-permit"));
        let yy = FilingYear::current().two_digit();
        assert_eq!(first.filing_number, format!("11001-0-{yy:02}-0001"));
        assert_eq!(second.filing_number, format!("11001-0-{yy:02}-0002"));
    }

    #[tokio::test]
    async fn issue_unknown_entity_fails() {
        let state = AppState::new();
        let err = issue(&state, Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, IssuanceError::NotFound(_)));
    }

    #[tokio::test]
    async fn issue_inactive_entity_fails_without_advancing() {
        let state = AppState::new();
        let entity_id = register(&state, false, NumberingType::Secretaria);

        let err = issue(&state, entity_id, None).await.unwrap_err();
        assert!(matches!(err, IssuanceError::EntityInactive(_)));
        assert!(state.ledger.is_empty());
    }

    #[tokio::test]
    async fn reserve_records_reason_and_consumes_sequence() {
        let state = AppState::new();
        let entity_id = register(&state, true, NumberingType::Curaduria);

        let reserved = reserve(&state, entity_id, "urgent pre-filing".to_string())
            .await
            .unwrap();
        assert_eq!(reserved.sequence, 1);
        assert_eq!(reserved.reserved_reason.as_deref(), Some("urgent pre-filing"));

        // The reservation consumed sequence 1; the next issue gets 2.
        let next = issue(&state, entity_id, None).await.unwrap();
        assert_eq!(next.sequence, 2);
    }

    #[test]
    fn retryable_codes_are_the_serialization_class() {
        // Non-database errors are never retried.
        assert!(!is_retryable(&sqlx::Error::RowNotFound));
        assert!(!is_retryable(&sqlx::Error::PoolTimedOut));
    }
}
