//! # Sequence Audit API
//!
//! Read-only endpoints that prove (or disprove) the gap-free, duplicate-
//! free property of an entity's filing year — the evidence auditors ask
//! for. Arbitrary concurrency, no locks taken.
//!
//! ## Endpoints
//!
//! - `GET /v1/entities/:id/sequence-problems?year=YYYY`
//! - `GET /v1/entities/:id/sequence-report?year=YYYY`

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use radicar_core::{FilingYear, SequenceProblem, SequenceReport};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::validation;

/// Year selector for audit endpoints. Defaults to the current filing year.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AuditQuery {
    /// Full 4-digit year to audit (e.g. 2025).
    pub year: Option<u16>,
}

impl AuditQuery {
    fn resolve(&self) -> Result<FilingYear, AppError> {
        match self.year {
            Some(year) => Ok(FilingYear::new(year)?),
            None => Ok(FilingYear::current()),
        }
    }
}

/// Build the audit router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/entities/:id/sequence-problems",
            get(get_sequence_problems),
        )
        .route(
            "/v1/entities/:id/sequence-report",
            get(get_sequence_report),
        )
}

/// GET /v1/entities/:id/sequence-problems — Gaps and duplicates in the
/// entity's buckets for the selected year.
#[utoipa::path(
    get,
    path = "/v1/entities/{id}/sequence-problems",
    params(("id" = Uuid, Path, description = "Entity ID"), AuditQuery),
    responses(
        (status = 200, description = "Every gap and duplicate found, ordered by regime then sequence"),
        (status = 404, description = "Entity not found", body = crate::error::ErrorBody),
        (status = 422, description = "Year outside 2000..=2099", body = crate::error::ErrorBody),
    ),
    tag = "audit"
)]
pub async fn get_sequence_problems(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<SequenceProblem>>, AppError> {
    let year = query.resolve()?;
    let problems = validation::sequence_problems(&state, id, year).await?;
    Ok(Json(problems))
}

/// GET /v1/entities/:id/sequence-report — Aggregate validity report.
#[utoipa::path(
    get,
    path = "/v1/entities/{id}/sequence-report",
    params(("id" = Uuid, Path, description = "Entity ID"), AuditQuery),
    responses(
        (status = 200, description = "Counts, problems, and validity percentage for the year"),
        (status = 404, description = "Entity not found", body = crate::error::ErrorBody),
    ),
    tag = "audit"
)]
pub async fn get_sequence_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<SequenceReport>, AppError> {
    let year = query.resolve()?;
    let report = validation::sequence_report(&state, id, year).await?;
    Ok(Json(report))
}
