//! # Entity Registry API
//!
//! Registration and lifecycle of the municipal planning entities that
//! file procedures. The registry is a collaborator of the radicación
//! core — issuance reads it, never the other way around.
//!
//! ## Endpoints
//!
//! - `POST /v1/entities` — register entity
//! - `GET /v1/entities` — list entities
//! - `GET /v1/entities/:id` — get entity
//! - `PUT /v1/entities/:id` — rename, reclassify, activate or deactivate

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use radicar_core::{DaneCode, NumberingType};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, EntityRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to register a new planning entity.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterEntityRequest {
    /// 5-digit DANE municipality code.
    #[schema(example = "11001")]
    pub dane_code: String,
    /// Legal name of the entity.
    pub name: String,
    /// Numbering regime. Optional for legacy imports, which fall back to
    /// the name heuristic.
    #[schema(value_type = Option<String>)]
    pub numbering_type: Option<NumberingType>,
    /// Whether the entity may file immediately. Defaults to true.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Validate for RegisterEntityRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request to update an existing entity.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEntityRequest {
    /// Updated legal name (optional).
    pub name: Option<String>,
    /// Updated numbering regime (optional).
    #[schema(value_type = Option<String>)]
    pub numbering_type: Option<NumberingType>,
    /// Updated activity flag (optional).
    pub active: Option<bool>,
}

impl Validate for UpdateEntityRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty if provided".to_string());
            }
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the entities router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/entities", get(list_entities).post(register_entity))
        .route("/v1/entities/:id", get(get_entity).put(update_entity))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/entities — Register a new entity.
#[utoipa::path(
    post,
    path = "/v1/entities",
    request_body = RegisterEntityRequest,
    responses(
        (status = 201, description = "Entity registered", body = EntityRecord),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "entities"
)]
pub async fn register_entity(
    State(state): State<AppState>,
    body: Result<Json<RegisterEntityRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EntityRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let dane_code = DaneCode::new(req.dane_code)?;

    let now = Utc::now();
    let record = EntityRecord {
        id: Uuid::new_v4(),
        dane_code,
        name: req.name,
        numbering_type: req.numbering_type,
        active: req.active,
        created_at: now,
        updated_at: now,
    };

    if let Some(pool) = &state.db_pool {
        crate::db::entities::insert(pool, &record).await?;
    }
    state.entities.insert(record.id, record.clone());

    tracing::info!(entity_id = %record.id, dane = %record.dane_code, "entity registered");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/entities — List all registered entities.
#[utoipa::path(
    get,
    path = "/v1/entities",
    responses(
        (status = 200, description = "List of entities", body = Vec<EntityRecord>),
    ),
    tag = "entities"
)]
pub async fn list_entities(State(state): State<AppState>) -> Json<Vec<EntityRecord>> {
    Json(state.entities.list())
}

/// GET /v1/entities/:id — Get a single entity.
#[utoipa::path(
    get,
    path = "/v1/entities/{id}",
    params(("id" = Uuid, Path, description = "Entity ID")),
    responses(
        (status = 200, description = "Entity found", body = EntityRecord),
        (status = 404, description = "Entity not found", body = crate::error::ErrorBody),
    ),
    tag = "entities"
)]
pub async fn get_entity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntityRecord>, AppError> {
    state
        .entities
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("entity {id} not found")))
}

/// PUT /v1/entities/:id — Update an entity.
#[utoipa::path(
    put,
    path = "/v1/entities/{id}",
    params(("id" = Uuid, Path, description = "Entity ID")),
    request_body = UpdateEntityRequest,
    responses(
        (status = 200, description = "Entity updated", body = EntityRecord),
        (status = 404, description = "Entity not found", body = crate::error::ErrorBody),
    ),
    tag = "entities"
)]
pub async fn update_entity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateEntityRequest>, JsonRejection>,
) -> Result<Json<EntityRecord>, AppError> {
    let req = extract_validated_json(body)?;

    let updated = state
        .entities
        .update(&id, |entity| {
            if let Some(name) = req.name {
                entity.name = name;
            }
            if let Some(numbering_type) = req.numbering_type {
                entity.numbering_type = Some(numbering_type);
            }
            if let Some(active) = req.active {
                entity.active = active;
            }
            entity.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound(format!("entity {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        crate::db::entities::update(pool, &updated).await?;
    }
    Ok(Json(updated))
}
