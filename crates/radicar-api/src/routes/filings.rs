//! # Filings — Radicación API
//!
//! Official filing-number issuance and validation.
//!
//! ## Endpoints
//!
//! - `POST /v1/filings/issue` — issue the next number, bound to a procedure
//! - `POST /v1/filings/reserve` — consume the next number ahead of intake
//! - `POST /v1/filings/validate` — run the four-stage validation
//! - `POST /v1/filings/validate-batch` — validate many candidates at once
//!
//! Issuance failures are hard errors (the number is a precondition for the
//! procedure record); validation rejections are 200 responses carrying the
//! failed stage and reason.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::issuance;
use crate::middleware::metrics::ApiMetrics;
use crate::state::{AppState, FilingRecord};
use crate::validation;

/// Largest accepted validate-batch payload.
const BATCH_LIMIT: usize = 500;

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to issue the next filing number for an entity.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueFilingRequest {
    /// The issuing entity.
    pub entity_id: Uuid,
    /// Procedure type to bind (e.g. "construction-permit").
    pub procedure_type: Option<String>,
}

impl Validate for IssueFilingRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref procedure_type) = self.procedure_type {
            if procedure_type.trim().is_empty() {
                return Err("procedure_type must not be empty if provided".to_string());
            }
        }
        Ok(())
    }
}

/// Request to reserve the next filing number ahead of intake.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReserveFilingRequest {
    /// The issuing entity.
    pub entity_id: Uuid,
    /// Audit reason for allocating before the procedure payload exists.
    pub reason: String,
}

impl Validate for ReserveFilingRequest {
    fn validate(&self) -> Result<(), String> {
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request to validate one candidate number.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateFilingRequest {
    /// The entity the candidate claims to belong to.
    pub entity_id: Uuid,
    /// The candidate filing-number string.
    pub number: String,
}

impl Validate for ValidateFilingRequest {
    fn validate(&self) -> Result<(), String> {
        if self.number.trim().is_empty() {
            return Err("number must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request to validate a batch of candidate numbers.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateBatchRequest {
    /// The entity the candidates claim to belong to.
    pub entity_id: Uuid,
    /// Candidate filing-number strings, validated independently.
    pub numbers: Vec<String>,
}

impl Validate for ValidateBatchRequest {
    fn validate(&self) -> Result<(), String> {
        if self.numbers.is_empty() {
            return Err("numbers must not be empty".to_string());
        }
        if self.numbers.len() > BATCH_LIMIT {
            return Err(format!("numbers must not exceed {BATCH_LIMIT} entries"));
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the filings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/filings/issue", post(issue_filing))
        .route("/v1/filings/reserve", post(reserve_filing))
        .route("/v1/filings/validate", post(validate_filing))
        .route("/v1/filings/validate-batch", post(validate_filing_batch))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/filings/issue — Issue the next filing number.
#[utoipa::path(
    post,
    path = "/v1/filings/issue",
    request_body = IssueFilingRequest,
    responses(
        (status = 201, description = "Filing number issued", body = FilingRecord),
        (status = 404, description = "Entity not found", body = crate::error::ErrorBody),
        (status = 409, description = "Entity inactive or sequence exhausted", body = crate::error::ErrorBody),
        (status = 503, description = "Counter contention, retry later", body = crate::error::ErrorBody),
    ),
    tag = "filings"
)]
pub async fn issue_filing(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
    body: Result<Json<IssueFilingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FilingRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let record = issuance::issue(&state, req.entity_id, req.procedure_type).await?;
    metrics.record_issuance();
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /v1/filings/reserve — Reserve the next filing number.
#[utoipa::path(
    post,
    path = "/v1/filings/reserve",
    request_body = ReserveFilingRequest,
    responses(
        (status = 201, description = "Filing number reserved", body = FilingRecord),
        (status = 404, description = "Entity not found", body = crate::error::ErrorBody),
        (status = 409, description = "Entity inactive or sequence exhausted", body = crate::error::ErrorBody),
    ),
    tag = "filings"
)]
pub async fn reserve_filing(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
    body: Result<Json<ReserveFilingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FilingRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let record = issuance::reserve(&state, req.entity_id, req.reason).await?;
    metrics.record_issuance();
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /v1/filings/validate — Four-stage validation of one candidate.
#[utoipa::path(
    post,
    path = "/v1/filings/validate",
    request_body = ValidateFilingRequest,
    responses(
        (status = 200, description = "Validation outcome (valid or rejected with stage and reason)"),
        (status = 404, description = "Entity not found", body = crate::error::ErrorBody),
    ),
    tag = "filings"
)]
pub async fn validate_filing(
    State(state): State<AppState>,
    body: Result<Json<ValidateFilingRequest>, JsonRejection>,
) -> Result<Json<radicar_core::ValidationResult>, AppError> {
    let req = extract_validated_json(body)?;
    let result = validation::validate_number(&state, req.entity_id, &req.number).await?;
    Ok(Json(result))
}

/// POST /v1/filings/validate-batch — Independent validation per element,
/// order preserved.
#[utoipa::path(
    post,
    path = "/v1/filings/validate-batch",
    request_body = ValidateBatchRequest,
    responses(
        (status = 200, description = "One validation outcome per candidate, in request order"),
        (status = 404, description = "Entity not found", body = crate::error::ErrorBody),
        (status = 422, description = "Empty or oversized batch", body = crate::error::ErrorBody),
    ),
    tag = "filings"
)]
pub async fn validate_filing_batch(
    State(state): State<AppState>,
    body: Result<Json<ValidateBatchRequest>, JsonRejection>,
) -> Result<Json<Vec<radicar_core::ValidationResult>>, AppError> {
    let req = extract_validated_json(body)?;
    let results = validation::validate_batch(&state, req.entity_id, &req.numbers).await?;
    Ok(Json(results))
}
