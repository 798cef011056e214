//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! The entity registry is held in a thread-safe in-memory [`Store`],
//! hydrated from PostgreSQL on startup and dual-written on mutation —
//! registry reads stay fast and synchronous. The issuance ledger is
//! different: filing numbers are durable legal identifiers, so in
//! database mode every counter advance and filing read goes straight to
//! PostgreSQL (row-locked, transactional; see `db::counters`), and the
//! in-memory [`ConsecutivoLedger`] is used only when no `DATABASE_URL`
//! is configured — a single-instance mode for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use radicar_core::{DaneCode, EntityId, NumberingType, RegisteredEntity};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::SecretToken;
use crate::ledger::ConsecutivoLedger;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if
    /// not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Records ------------------------------------------------------------------

/// A registered municipal planning entity (secretaría or curaduría urbana).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntityRecord {
    /// Registry identifier.
    pub id: Uuid,
    /// 5-digit DANE municipality code.
    #[schema(value_type = String, example = "11001")]
    pub dane_code: DaneCode,
    /// Legal name.
    pub name: String,
    /// Numbering regime declared at registration. `None` for legacy
    /// records classified by the name heuristic.
    #[schema(value_type = Option<String>)]
    pub numbering_type: Option<NumberingType>,
    /// Whether the entity may currently file procedures.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityRecord {
    /// The registry snapshot the core engines operate on.
    pub fn registered(&self) -> RegisteredEntity {
        RegisteredEntity {
            id: EntityId::from_uuid(self.id),
            dane_code: self.dane_code.clone(),
            name: self.name.clone(),
            numbering_type: self.numbering_type,
            active: self.active,
        }
    }
}

/// A persisted filing record bound to an official filing number.
///
/// The `filing_number` string is the durable legal identifier; the
/// decomposed components are denormalized alongside it so audit queries
/// never re-parse.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FilingRecord {
    /// Storage identifier.
    pub id: Uuid,
    /// The issuing entity.
    pub entity_id: Uuid,
    /// The official number, e.g. `11001-0-25-0001`. Globally unique.
    pub filing_number: String,
    /// DANE component.
    #[schema(value_type = String, example = "11001")]
    pub dane_code: DaneCode,
    /// Numbering-regime component.
    #[schema(value_type = String)]
    pub numbering_type: NumberingType,
    /// Full 4-digit filing year.
    pub year: u16,
    /// Sequence component, 1..=9999.
    pub sequence: u32,
    /// Procedure type bound at issuance. `None` for reservations.
    pub procedure_type: Option<String>,
    /// Audit reason recorded when the number was reserved ahead of the
    /// full procedure payload. `None` for regular issuance.
    pub reserved_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

// -- Application State --------------------------------------------------------

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token for authentication.
    /// If `None`, authentication is disabled.
    pub auth_token: Option<SecretToken>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each component.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Entity registry, hydrated from the database on startup.
    pub entities: Store<EntityRecord>,
    /// In-memory issuance ledger. Authoritative only when `db_pool` is
    /// `None`; single-instance by construction.
    pub ledger: ConsecutivoLedger,
    /// PostgreSQL connection pool. When `Some`, counter advancement and
    /// filing persistence are durable and multi-instance safe.
    pub db_pool: Option<PgPool>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration and no
    /// database pool (in-memory, single-instance mode).
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create a new application state with the given configuration and
    /// optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            entities: Store::new(),
            ledger: ConsecutivoLedger::new(),
            db_pool,
            config,
        }
    }

    /// Hydrate the entity registry from the database.
    ///
    /// Called once on startup when a database pool is available, so that
    /// registry reads remain fast and synchronous.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let entities = crate::db::entities::load_all(pool).await?;
        let entity_count = entities.len();
        for record in entities {
            self.entities.insert(record.id, record);
        }

        tracing::info!(entities = entity_count, "hydrated entity registry from database");
        Ok(())
    }

    /// Fetch an entity, authoritatively.
    ///
    /// Database mode reads the registry row (another instance may have
    /// registered or deactivated the entity); memory mode reads the store.
    pub async fn fetch_entity(&self, id: Uuid) -> Result<Option<EntityRecord>, sqlx::Error> {
        match &self.db_pool {
            Some(pool) => crate::db::entities::get(pool, id).await,
            None => Ok(self.entities.get(&id)),
        }
    }

    /// Whether a persisted filing already carries `number`.
    pub async fn filing_exists(&self, number: &str) -> Result<bool, sqlx::Error> {
        match &self.db_pool {
            Some(pool) => crate::db::filings::exists(pool, number).await,
            None => Ok(self.ledger.contains(number)),
        }
    }

    /// The counter watermark for a bucket, `None` when it has never issued.
    pub async fn bucket_watermark(
        &self,
        entity_id: Uuid,
        numbering_type: NumberingType,
        year: u16,
    ) -> Result<Option<u32>, sqlx::Error> {
        match &self.db_pool {
            Some(pool) => {
                crate::db::counters::watermark(pool, entity_id, numbering_type, year).await
            }
            None => Ok(self.ledger.watermark(entity_id, numbering_type, year)),
        }
    }

    /// Sequence components of every persisted filing in a bucket,
    /// duplicates included, ascending.
    pub async fn bucket_sequences(
        &self,
        entity_id: Uuid,
        numbering_type: NumberingType,
        year: u16,
    ) -> Result<Vec<u32>, sqlx::Error> {
        match &self.db_pool {
            Some(pool) => {
                crate::db::filings::sequences(pool, entity_id, numbering_type, year).await
            }
            None => Ok(self.ledger.sequences(entity_id, numbering_type, year)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entity(id: Uuid) -> EntityRecord {
        let now = Utc::now();
        EntityRecord {
            id,
            dane_code: DaneCode::new("11001").unwrap(),
            name: "Secretaría de Planeación de Bogotá".to_string(),
            numbering_type: Some(NumberingType::Secretaria),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    // -- Store tests ----------------------------------------------------------

    #[test]
    fn store_new_creates_empty_store() {
        let store: Store<EntityRecord> = Store::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.list().is_empty());
    }

    #[test]
    fn store_insert_and_get_roundtrip() {
        let store = Store::new();
        let id = Uuid::new_v4();
        assert!(store.insert(id, sample_entity(id)).is_none());

        let retrieved = store.get(&id).unwrap();
        assert_eq!(retrieved.id, id);
        assert_eq!(retrieved.dane_code.as_str(), "11001");
    }

    #[test]
    fn store_insert_returns_previous_value() {
        let store = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, sample_entity(id));
        assert!(store.insert(id, sample_entity(id)).is_some());
    }

    #[test]
    fn store_update_modifies_existing() {
        let store = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, sample_entity(id));

        let updated = store.update(&id, |e| e.active = false).unwrap();
        assert!(!updated.active);
        assert!(!store.get(&id).unwrap().active);
    }

    #[test]
    fn store_update_returns_none_for_missing_key() {
        let store: Store<EntityRecord> = Store::new();
        assert!(store.update(&Uuid::new_v4(), |e| e.active = false).is_none());
    }

    #[test]
    fn store_clone_shares_underlying_data() {
        let store = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, sample_entity(id));

        let clone = store.clone();
        let id2 = Uuid::new_v4();
        clone.insert(id2, sample_entity(id2));
        assert_eq!(store.len(), 2);
    }

    // -- EntityRecord ---------------------------------------------------------

    #[test]
    fn registered_snapshot_carries_components() {
        let id = Uuid::new_v4();
        let record = sample_entity(id);
        let registered = record.registered();
        assert_eq!(*registered.id.as_uuid(), id);
        assert_eq!(registered.numbering_type(), NumberingType::Secretaria);
        assert!(registered.active);
    }

    // -- AppState -------------------------------------------------------------

    #[test]
    fn app_state_new_is_memory_mode() {
        let state = AppState::new();
        assert!(state.entities.is_empty());
        assert!(state.db_pool.is_none());
        assert_eq!(state.config.port, 8080);
        assert!(state.config.auth_token.is_none());
    }

    #[tokio::test]
    async fn app_state_memory_reads_hit_the_ledger() {
        let state = AppState::new();
        assert!(!state.filing_exists("11001-0-25-0001").await.unwrap());
        assert_eq!(
            state
                .bucket_watermark(Uuid::new_v4(), NumberingType::Secretaria, 2025)
                .await
                .unwrap(),
            None
        );
    }
}
