//! # Registered Entity Read-Model
//!
//! The slice of the entity registry the radicación core needs: identity,
//! municipality, declared numbering regime, and activity flag. The registry
//! itself (CRUD, verification workflow) is an external collaborator; this
//! type is the snapshot it hands the issuance and validation paths.

use serde::{Deserialize, Serialize};

use crate::identity::{DaneCode, EntityId};
use crate::numbering::NumberingType;

/// Registry snapshot of a municipal planning entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredEntity {
    /// Registry identifier.
    pub id: EntityId,
    /// Municipality the entity files for.
    pub dane_code: DaneCode,
    /// Legal name, as registered.
    pub name: String,
    /// Numbering regime declared at registration. `None` for legacy
    /// records that predate the field.
    pub numbering_type: Option<NumberingType>,
    /// Whether the entity may currently file procedures.
    pub active: bool,
}

impl RegisteredEntity {
    /// The numbering regime used for this entity's filing numbers.
    ///
    /// Prefers the declared [`NumberingType`]; falls back to the legacy
    /// name heuristic for records that never declared one.
    pub fn numbering_type(&self) -> NumberingType {
        self.numbering_type
            .unwrap_or_else(|| NumberingType::classify_name(&self.name))
    }
}
