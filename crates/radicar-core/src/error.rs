//! # Error Hierarchy
//!
//! Structured error types for the Radicar core, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Construction-time failures of domain primitives are [`ValidationError`];
//! wire-format failures of a candidate filing number are
//! [`FilingNumberError`]. Issuance failures (overflow, inactive entity,
//! contention) live in `radicar-api` next to the storage layer that
//! produces them.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
///
/// Each identifier type enforces format constraints at construction time.
/// These errors carry the invalid input and the expected format so that
/// operators can diagnose misconfiguration without guesswork.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// DANE code does not conform to the 5-digit municipal format.
    #[error("invalid DANE code: \"{0}\" (expected 5 digits)")]
    InvalidDaneCode(String),

    /// Filing year is outside the representable two-digit window.
    #[error(
        "invalid filing year: {0} (expected {}..={})",
        crate::filing::FilingYear::MIN,
        crate::filing::FilingYear::MAX
    )]
    InvalidFilingYear(u16),

    /// Entity name is empty after trimming.
    #[error("invalid entity name: must be non-empty")]
    InvalidEntityName,
}

/// Errors parsing a candidate filing-number string.
///
/// The wire contract is byte-exact: `^\d{5}-(0|CUR)-\d{2}-\d{4}$`.
/// Each variant names the offending segment so the FORMAT validation stage
/// can report precisely what was malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilingNumberError {
    /// The candidate did not split into exactly four dash-separated segments.
    #[error("expected 4 dash-separated segments, found {0}")]
    SegmentCount(usize),

    /// The DANE segment is not 5 digits.
    #[error("invalid DANE segment \"{0}\" (expected 5 digits)")]
    DaneSegment(String),

    /// The numbering-type segment is neither `0` nor `CUR`.
    #[error("unknown numbering code \"{0}\" (expected \"0\" or \"CUR\")")]
    TypeSegment(String),

    /// The year segment is not 2 digits.
    #[error("invalid year segment \"{0}\" (expected 2 digits)")]
    YearSegment(String),

    /// The sequence segment is not 4 digits, or is `0000`.
    #[error("invalid sequence segment \"{0}\" (expected 4 digits in 0001..=9999)")]
    SequenceSegment(String),
}
