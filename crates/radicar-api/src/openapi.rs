//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Radicar API — Official Filing-Number Issuance",
        version = "0.3.2",
        description = "Radicación services for Colombian municipal planning entities: sequential filing-number issuance, staged validation, and sequence audit.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Filings
        crate::routes::filings::issue_filing,
        crate::routes::filings::reserve_filing,
        crate::routes::filings::validate_filing,
        crate::routes::filings::validate_filing_batch,
        // Entities
        crate::routes::entities::register_entity,
        crate::routes::entities::list_entities,
        crate::routes::entities::get_entity,
        crate::routes::entities::update_entity,
        // Audit
        crate::routes::audit::get_sequence_problems,
        crate::routes::audit::get_sequence_report,
    ),
    components(schemas(
        crate::routes::filings::IssueFilingRequest,
        crate::routes::filings::ReserveFilingRequest,
        crate::routes::filings::ValidateFilingRequest,
        crate::routes::filings::ValidateBatchRequest,
        crate::routes::entities::RegisterEntityRequest,
        crate::routes::entities::UpdateEntityRequest,
        crate::state::EntityRecord,
        crate::state::FilingRecord,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "filings", description = "Official filing-number issuance and validation"),
        (name = "entities", description = "Planning-entity registry"),
        (name = "audit", description = "Sequence audit and validity reporting"),
    )
)]
pub struct ApiDoc;

/// Router serving the generated spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
