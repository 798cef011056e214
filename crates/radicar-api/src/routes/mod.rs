//! # API Route Modules
//!
//! Route modules for the Radicar API surface:
//!
//! - `filings` — the radicación core: issue, reserve, validate, and
//!   batch-validate official filing numbers.
//! - `entities` — the entity registry collaborator: register and manage
//!   the secretarías and curadurías that file procedures.
//! - `audit` — read-only sequence audit: gap/duplicate detection and the
//!   aggregate validity report per entity and year.

pub mod audit;
pub mod entities;
pub mod filings;
