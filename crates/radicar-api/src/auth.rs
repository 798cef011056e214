//! # Authentication Middleware
//!
//! Static bearer-token middleware. The counter and filing endpoints issue
//! durable legal identifiers, so the whole `/v1` surface sits behind the
//! token when one is configured; health probes stay open for orchestrators.
//!
//! Token comparison is constant-time (`subtle`) to keep the secret out of
//! timing side channels. When `AUTH_TOKEN` is unset, authentication is
//! disabled — acceptable only behind a trusted gateway.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use crate::error::{ErrorBody, ErrorDetail};

/// A bearer token that never appears in logs.
///
/// Custom `Debug` redacts the value; comparison is constant-time.
#[derive(Clone)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wrap a token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Constant-time comparison against a presented token.
    ///
    /// Length is compared first — only the token length can leak, never
    /// its contents.
    pub fn matches(&self, presented: &str) -> bool {
        let expected = self.0.as_bytes();
        let presented = presented.as_bytes();
        expected.len() == presented.len() && expected.ct_eq(presented).into()
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretToken([REDACTED])")
    }
}

/// Auth configuration injected as a request extension.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The expected bearer token. `None` disables authentication.
    pub token: Option<SecretToken>,
}

/// Middleware enforcing the bearer token on every request it wraps.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.token.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) if expected.matches(token) => next.run(request).await,
        _ => unauthorized_response(),
    }
}

fn unauthorized_response() -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: "missing or invalid bearer token".to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
