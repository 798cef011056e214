#![deny(missing_docs)]

//! # radicar-core — Foundational Types for the Radicar Stack
//!
//! This crate defines the domain core of the radicación subsystem: official
//! filing-number issuance for Colombian municipal planning entities. It has
//! no internal crate dependencies — only `serde`, `serde_json`, `thiserror`,
//! `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass a [`DaneCode`] where an [`EntityId`]
//!    is expected, and a [`FilingNumber`] cannot exist with an out-of-range
//!    sequence.
//!
//! 2. **Pure engines, impure shells.** The staged validator
//!    ([`validate::validate`]) and the gap/duplicate detector
//!    ([`audit::detect_problems`]) are pure functions over snapshots the
//!    caller assembles. Persistence lives entirely in `radicar-api`.
//!
//! 3. **Validation outcomes are data.** A rejected filing number is a
//!    [`ValidationResult`] carrying the failed stage and reason — never an
//!    `Err`. Batch validation and audit reports collect many outcomes
//!    without aborting.
//!
//! 4. **Structured errors with `thiserror`.** No `Box<dyn Error>`, no
//!    `.unwrap()` outside tests.

pub mod audit;
pub mod entity;
pub mod error;
pub mod filing;
pub mod identity;
pub mod numbering;
pub mod validate;

// Re-export primary types at crate root for ergonomic imports.
pub use audit::{BucketSnapshot, ProblemKind, SequenceProblem, SequenceReport};
pub use entity::RegisteredEntity;
pub use error::{FilingNumberError, ValidationError};
pub use filing::{FilingNumber, FilingYear};
pub use identity::{DaneCode, EntityId};
pub use numbering::NumberingType;
pub use validate::{ValidationContext, ValidationResult, ValidationStage};
