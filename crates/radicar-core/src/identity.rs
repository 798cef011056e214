//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers in the radicación subsystem.
//! Each identifier is a distinct type — you cannot pass a [`DaneCode`]
//! where an [`EntityId`] is expected.
//!
//! ## Validation
//!
//! [`DaneCode`] validates format at construction time. [`EntityId`] is
//! UUID-based and always valid by construction.
//!
//! ## Reference
//!
//! DANE code: Colombia's 5-digit official municipality identifier, assigned
//! by the Departamento Administrativo Nacional de Estadística.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A unique identifier for a municipal planning entity (secretaría or
/// curaduría urbana) registered in the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Create a new random entity identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entity identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Colombia's official 5-digit municipality code.
///
/// Leading zeros are significant (e.g., `"05001"` is Medellín), so the
/// canonical representation is a string of exactly 5 ASCII digits.
///
/// # Validation
///
/// - Must be exactly 5 digits (0-9)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaneCode(String);

impl DaneCode {
    /// Create a DANE code from a string value, validating the 5-digit format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDaneCode`] if the string is not
    /// exactly 5 digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.len() != 5 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidDaneCode(s));
        }
        Ok(Self(s))
    }

    /// Access the DANE code string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DaneCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
