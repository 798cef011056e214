//! # radicar-api — Axum API Service for the Radicar Stack
//!
//! The radicación service: every accepted municipal procedure receives a
//! unique, strictly sequential, entity- and year-scoped official number
//! (`DANE-TYPE-YY-NNNN`), and the service can later prove the sequence
//! has no gaps and no duplicates.
//!
//! ## API Surface
//!
//! | Prefix                          | Module              | Domain             |
//! |---------------------------------|---------------------|--------------------|
//! | `/v1/filings/*`                 | [`routes::filings`] | Issuance & validation |
//! | `/v1/entities`                  | [`routes::entities`]| Registry collaborator |
//! | `/v1/entities/:id/sequence-*`   | [`routes::audit`]   | Sequence audit     |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Auto-generated spec via utoipa derive macros at `/openapi.json`.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod issuance;
pub mod ledger;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod validation;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::filings::router())
        .merge(routes::entities::router())
        .merge(routes::audit::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
