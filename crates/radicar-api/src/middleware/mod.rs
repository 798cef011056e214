//! # Middleware
//!
//! Request-scoped layers wrapping the API surface. Authentication lives
//! in `crate::auth`; this module holds the observability layers.

pub mod metrics;
