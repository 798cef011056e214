//! # Validation & Audit Orchestration
//!
//! Assembles authoritative snapshots from the registry, the filing
//! repository, and the counter store, then hands them to the pure engines
//! in `radicar-core`. Rejections come back as data (`ValidationResult`,
//! `SequenceProblem`) — only the inability to serve the request (unknown
//! entity, storage failure) surfaces as an [`AppError`].

use radicar_core::audit::{build_report, detect_problems, BucketSnapshot};
use radicar_core::validate::{validate, ValidationContext, ValidationResult};
use radicar_core::{EntityId, FilingYear, NumberingType, SequenceProblem, SequenceReport};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, EntityRecord};

async fn require_entity(state: &AppState, entity_id: Uuid) -> Result<EntityRecord, AppError> {
    state
        .fetch_entity(entity_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("entity {entity_id} not found")))
}

/// Validate one candidate number against the entity's authoritative state.
pub async fn validate_number(
    state: &AppState,
    entity_id: Uuid,
    candidate: &str,
) -> Result<ValidationResult, AppError> {
    let entity = require_entity(state, entity_id).await?;
    let registered = entity.registered();
    let current_year = FilingYear::current();
    let numbering_type = registered.numbering_type();

    let already_issued = state.filing_exists(candidate).await?;
    let watermark = state
        .bucket_watermark(entity_id, numbering_type, current_year.value())
        .await?;

    let ctx = ValidationContext {
        entity: registered,
        current_year,
        already_issued,
        watermark,
    };
    Ok(validate(candidate, &ctx))
}

/// Validate a batch of candidates, independently, order preserved.
pub async fn validate_batch(
    state: &AppState,
    entity_id: Uuid,
    candidates: &[String],
) -> Result<Vec<ValidationResult>, AppError> {
    // Fail fast on an unknown entity rather than returning N identical 404s.
    require_entity(state, entity_id).await?;

    let mut results = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        results.push(validate_number(state, entity_id, candidate).await?);
    }
    Ok(results)
}

async fn bucket_snapshot(
    state: &AppState,
    entity_id: Uuid,
    numbering_type: NumberingType,
    year: FilingYear,
) -> Result<BucketSnapshot, AppError> {
    let last_sequence = state
        .bucket_watermark(entity_id, numbering_type, year.value())
        .await?;
    let issued = state
        .bucket_sequences(entity_id, numbering_type, year.value())
        .await?;
    Ok(BucketSnapshot {
        numbering_type,
        last_sequence,
        issued,
    })
}

/// Reconstruct the expected dense sequence for each of the entity's
/// buckets in `year` and report every gap and duplicate.
pub async fn sequence_problems(
    state: &AppState,
    entity_id: Uuid,
    year: FilingYear,
) -> Result<Vec<SequenceProblem>, AppError> {
    require_entity(state, entity_id).await?;

    let mut problems = Vec::new();
    for numbering_type in NumberingType::ALL {
        let snapshot = bucket_snapshot(state, entity_id, numbering_type, year).await?;
        if let Some(last_sequence) = snapshot.last_sequence {
            problems.extend(detect_problems(
                numbering_type,
                year,
                last_sequence,
                &snapshot.issued,
            ));
        }
    }
    Ok(problems)
}

/// Build the aggregate validity report for an entity's filing year.
pub async fn sequence_report(
    state: &AppState,
    entity_id: Uuid,
    year: FilingYear,
) -> Result<SequenceReport, AppError> {
    require_entity(state, entity_id).await?;

    let mut buckets = Vec::with_capacity(NumberingType::ALL.len());
    for numbering_type in NumberingType::ALL {
        buckets.push(bucket_snapshot(state, entity_id, numbering_type, year).await?);
    }
    Ok(build_report(EntityId::from_uuid(entity_id), year, &buckets))
}
