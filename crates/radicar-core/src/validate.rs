//! # Staged Filing-Number Validator
//!
//! A candidate filing number passes through four ordered stages, short-
//! circuiting on the first failure:
//!
//! 1. **FORMAT** — the string parses as a [`FilingNumber`].
//! 2. **COMPONENTS** — every component is consistent with the claimed
//!    entity: its DANE code, its numbering regime, the current filing year.
//! 3. **UNIQUENESS** — no persisted filing already carries the number.
//! 4. **SEQUENCE** — the sequence is exactly the next value for the
//!    entity's counter bucket (or 1 when the bucket has never issued).
//!
//! The engine is pure: the caller assembles a [`ValidationContext`]
//! snapshot from authoritative reads and receives a [`ValidationResult`]
//! as data. Rejections are never errors — batch validation and audit
//! reports collect many outcomes without aborting.

use serde::{Deserialize, Serialize};

use crate::entity::RegisteredEntity;
use crate::filing::{FilingNumber, FilingYear};

/// The validation stages, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStage {
    /// Structural wire-format check.
    Format,
    /// Component consistency against the claimed entity.
    Components,
    /// Global uniqueness across all persisted filings.
    Uniqueness,
    /// Dense-sequence position check against the counter watermark.
    Sequence,
}

impl ValidationStage {
    /// The stage name as reported in validation results.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "FORMAT",
            Self::Components => "COMPONENTS",
            Self::Uniqueness => "UNIQUENESS",
            Self::Sequence => "SEQUENCE",
        }
    }
}

impl std::fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one candidate number. Data, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The candidate string exactly as submitted.
    pub number: String,
    /// Whether all four stages passed.
    pub valid: bool,
    /// The stage that rejected the candidate. `None` when valid.
    pub stage: Option<ValidationStage>,
    /// Human-readable rejection reason. `None` when valid.
    pub reason: Option<String>,
}

impl ValidationResult {
    /// A candidate that passed all stages.
    pub fn passed(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            valid: true,
            stage: None,
            reason: None,
        }
    }

    /// A candidate rejected at `stage` for `reason`.
    pub fn failed(
        number: impl Into<String>,
        stage: ValidationStage,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            valid: false,
            stage: Some(stage),
            reason: Some(reason.into()),
        }
    }
}

/// Snapshot of the authoritative state a validation runs against.
///
/// The caller (the API layer) assembles this from the entity registry, the
/// filing repository, and the counter store. The UNIQUENESS read feeding a
/// real issuance must be current; standalone validations tolerate slightly
/// stale snapshots.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// The entity the candidate claims to belong to.
    pub entity: RegisteredEntity,
    /// The filing year numbers are currently issued under.
    pub current_year: FilingYear,
    /// Whether a persisted filing already carries the candidate string.
    pub already_issued: bool,
    /// The bucket's `last_sequence` watermark, `None` when the bucket has
    /// never issued.
    pub watermark: Option<u32>,
}

/// Run the four-stage validation of `candidate` against `ctx`.
pub fn validate(candidate: &str, ctx: &ValidationContext) -> ValidationResult {
    // Stage 1: FORMAT
    let parsed: FilingNumber = match candidate.parse() {
        Ok(parsed) => parsed,
        Err(err) => return ValidationResult::failed(candidate, ValidationStage::Format, err.to_string()),
    };

    // Stage 2: COMPONENTS
    if parsed.dane_code() != &ctx.entity.dane_code {
        return ValidationResult::failed(
            candidate,
            ValidationStage::Components,
            format!(
                "DANE code mismatch: number carries {}, entity is registered under {}",
                parsed.dane_code(),
                ctx.entity.dane_code
            ),
        );
    }
    let expected_type = ctx.entity.numbering_type();
    if parsed.numbering_type() != expected_type {
        return ValidationResult::failed(
            candidate,
            ValidationStage::Components,
            format!(
                "numbering code mismatch: number carries {}, entity files under {}",
                parsed.numbering_type().code(),
                expected_type.code()
            ),
        );
    }
    if parsed.year() != ctx.current_year {
        return ValidationResult::failed(
            candidate,
            ValidationStage::Components,
            format!(
                "year mismatch: number carries {:02}, current filing year is {:02}",
                parsed.year().two_digit(),
                ctx.current_year.two_digit()
            ),
        );
    }
    // Sequence bounds (1..=9999) are enforced by the parser in stage 1.

    // Stage 3: UNIQUENESS
    if ctx.already_issued {
        return ValidationResult::failed(
            candidate,
            ValidationStage::Uniqueness,
            "a persisted filing already carries this number",
        );
    }

    // Stage 4: SEQUENCE
    let expected = ctx.watermark.map_or(1, |last| last + 1);
    if parsed.sequence() != expected {
        return ValidationResult::failed(
            candidate,
            ValidationStage::Sequence,
            format!(
                "out of order: expected {expected:04}, received {:04}",
                parsed.sequence()
            ),
        );
    }

    ValidationResult::passed(candidate)
}
