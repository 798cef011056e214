//! # Numbering Classification
//!
//! The two numbering regimes recognized by Colombian urban-planning law:
//! municipal secretarías file under code `0`, curadurías urbanas under
//! code `CUR`. The numbering type selects the counter bucket and the
//! second segment of the wire format.
//!
//! The authoritative classification is the explicit `numbering_type`
//! declared when an entity is registered. [`NumberingType::classify_name`]
//! is a fallback for legacy records registered before the field existed;
//! it pattern-matches on the entity's free-text name.

use serde::{Deserialize, Serialize};

use crate::error::FilingNumberError;

/// The numbering regime of a planning entity.
///
/// Serializes as `"secretaria"` / `"curaduria"` on the JSON surface; the
/// wire code inside filing numbers and the database is [`Self::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingType {
    /// Municipal government planning department. Wire code `0`.
    Secretaria,
    /// Privately-operated curaduría urbana with delegated public authority.
    /// Wire code `CUR`.
    Curaduria,
}

impl NumberingType {
    /// Both numbering types, in wire-code order. Audit sweeps iterate this.
    pub const ALL: [NumberingType; 2] = [NumberingType::Secretaria, NumberingType::Curaduria];

    /// The wire code used in filing numbers and counter rows.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Secretaria => "0",
            Self::Curaduria => "CUR",
        }
    }

    /// Resolve a wire code back to a numbering type.
    ///
    /// # Errors
    ///
    /// Returns [`FilingNumberError::TypeSegment`] for anything other than
    /// `"0"` or `"CUR"`.
    pub fn from_code(code: &str) -> Result<Self, FilingNumberError> {
        match code {
            "0" => Ok(Self::Secretaria),
            "CUR" => Ok(Self::Curaduria),
            other => Err(FilingNumberError::TypeSegment(other.to_string())),
        }
    }

    /// Heuristic classification from an entity's legal name.
    ///
    /// Legacy fallback only: entities registered before the explicit
    /// `numbering_type` field existed are classified by whether the name
    /// mentions "curadur"/"curador" (case-insensitive, accent-blind for
    /// the common ASCII spellings).
    pub fn classify_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("curadur") || lower.contains("curador") {
            Self::Curaduria
        } else {
            Self::Secretaria
        }
    }
}

impl std::fmt::Display for NumberingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_wire_exact() {
        assert_eq!(NumberingType::Secretaria.code(), "0");
        assert_eq!(NumberingType::Curaduria.code(), "CUR");
    }

    #[test]
    fn from_code_roundtrip() {
        for nt in NumberingType::ALL {
            assert_eq!(NumberingType::from_code(nt.code()).unwrap(), nt);
        }
    }

    #[test]
    fn from_code_rejects_unknown() {
        assert!(NumberingType::from_code("cur").is_err()); // case-sensitive
        assert!(NumberingType::from_code("1").is_err());
        assert!(NumberingType::from_code("").is_err());
    }

    #[test]
    fn classify_name_detects_curaduria() {
        assert_eq!(
            NumberingType::classify_name("Curaduría Urbana No. 2 de Bogotá"),
            NumberingType::Curaduria
        );
        assert_eq!(
            NumberingType::classify_name("OFICINA DEL CURADOR URBANO PRIMERO"),
            NumberingType::Curaduria
        );
    }

    #[test]
    fn classify_name_defaults_to_secretaria() {
        assert_eq!(
            NumberingType::classify_name("Secretaría de Planeación Municipal"),
            NumberingType::Secretaria
        );
        assert_eq!(
            NumberingType::classify_name("Alcaldía de Medellín"),
            NumberingType::Secretaria
        );
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&NumberingType::Curaduria).unwrap();
        assert_eq!(json, "\"curaduria\"");
        let back: NumberingType = serde_json::from_str("\"secretaria\"").unwrap();
        assert_eq!(back, NumberingType::Secretaria);
    }
}
