//! # radicar-cli — CLI Tool for the Radicar Stack
//!
//! Provides the `radicar` command-line interface for operators of the
//! radicación service and the auditors who verify its sequences.
//!
//! ## Subcommands
//!
//! - `radicar inspect` — Offline decomposition of a filing-number string.
//! - `radicar validate` — Remote four-stage validation against a running
//!   service.
//! - `radicar report` — Fetch the sequence-audit report for an entity and
//!   year.
//!
//! Exit codes follow the convention: 0 success/valid, 1 invalid or
//! problems found, 2 operational error.

pub mod client;
pub mod inspect;
pub mod report;
pub mod validate;
