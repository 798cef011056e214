//! # Integration Tests for radicar-api
//!
//! Exercises the full router in in-memory mode: entity registration,
//! filing-number issuance and reservation, the four-stage validator,
//! batch validation, sequence audit, authentication middleware, and
//! OpenAPI spec generation.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use radicar_api::auth::SecretToken;
use radicar_api::state::{AppConfig, AppState};

/// Helper: build the test app with auth disabled.
fn test_app() -> axum::Router {
    radicar_api::app(AppState::new())
}

/// Helper: build the test app with auth enabled.
fn test_app_with_auth(token: &str) -> axum::Router {
    let config = AppConfig {
        port: 8080,
        auth_token: Some(SecretToken::new(token)),
    };
    radicar_api::app(AppState::with_config(config, None))
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper: POST a JSON payload.
async fn post_json(
    app: &axum::Router,
    uri: &str,
    payload: serde_json::Value,
) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Helper: GET a path.
async fn get_path(app: &axum::Router, uri: &str) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Helper: register an entity and return its id.
async fn register_entity(
    app: &axum::Router,
    dane: &str,
    name: &str,
    numbering_type: Option<&str>,
) -> String {
    let mut payload = serde_json::json!({ "dane_code": dane, "name": name });
    if let Some(nt) = numbering_type {
        payload["numbering_type"] = serde_json::json!(nt);
    }
    let response = post_json(app, "/v1/entities", payload).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// The two-digit year filing numbers are issued under right now.
fn current_yy() -> String {
    use chrono::Datelike;
    format!("{:02}", chrono::Utc::now().year() % 100)
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = get_path(&test_app(), "/health/liveness").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = get_path(&test_app(), "/health/readiness").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Entity Registry ----------------------------------------------------------

#[tokio::test]
async fn test_register_entity_returns_record() {
    let app = test_app();
    let response = post_json(
        &app,
        "/v1/entities",
        serde_json::json!({
            "dane_code": "11001",
            "name": "Secretaría Distrital de Planeación",
            "numbering_type": "secretaria"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["dane_code"], "11001");
    assert_eq!(body["numbering_type"], "secretaria");
    assert_eq!(body["active"], true);
}

#[tokio::test]
async fn test_register_entity_rejects_bad_dane() {
    let app = test_app();
    let response = post_json(
        &app,
        "/v1/entities",
        serde_json::json!({ "dane_code": "1100", "name": "Secretaría" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_register_entity_rejects_empty_name() {
    let app = test_app();
    let response = post_json(
        &app,
        "/v1/entities",
        serde_json::json!({ "dane_code": "11001", "name": "  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_entity_not_found() {
    let app = test_app();
    let response = get_path(
        &app,
        "/v1/entities/00000000-0000-0000-0000-000000000000",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_entity_deactivates() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/v1/entities/{id}"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"active": false}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["active"], false);
}

// -- Issuance -----------------------------------------------------------------

#[tokio::test]
async fn test_issue_first_and_second_numbers() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", Some("secretaria")).await;
    let yy = current_yy();

    let first = post_json(
        &app,
        "/v1/filings/issue",
        serde_json::json!({ "entity_id": id, "procedure_type": "construction-permit" }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;
    assert_eq!(first["filing_number"], format!("11001-0-{yy}-0001"));
    assert_eq!(first["sequence"], 1);
    assert_eq!(first["procedure_type"], "construction-permit");

    let second = post_json(
        &app,
        "/v1/filings/issue",
        serde_json::json!({ "entity_id": id }),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CREATED);
    let second = body_json(second).await;
    assert_eq!(second["filing_number"], format!("11001-0-{yy}-0002"));
}

#[tokio::test]
async fn test_issue_curaduria_number() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Curaduría Urbana No. 1", Some("curaduria")).await;

    let response = post_json(
        &app,
        "/v1/filings/issue",
        serde_json::json!({ "entity_id": id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(
        body["filing_number"],
        format!("11001-CUR-{}-0001", current_yy())
    );
}

#[tokio::test]
async fn test_legacy_entity_classified_by_name() {
    let app = test_app();
    // No declared numbering_type: the name heuristic applies.
    let id = register_entity(&app, "05001", "Curaduría Urbana Segunda de Medellín", None).await;

    let response = post_json(
        &app,
        "/v1/filings/issue",
        serde_json::json!({ "entity_id": id }),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(
        body["filing_number"],
        format!("05001-CUR-{}-0001", current_yy())
    );
}

#[tokio::test]
async fn test_issue_unknown_entity_404() {
    let app = test_app();
    let response = post_json(
        &app,
        "/v1/filings/issue",
        serde_json::json!({ "entity_id": "00000000-0000-0000-0000-000000000000" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_issue_inactive_entity_409() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;
    app.clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/v1/entities/{id}"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"active": false}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = post_json(
        &app,
        "/v1/filings/issue",
        serde_json::json!({ "entity_id": id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_reserve_consumes_sequence() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;

    let reserved = post_json(
        &app,
        "/v1/filings/reserve",
        serde_json::json!({ "entity_id": id, "reason": "urgent pre-filing" }),
    )
    .await;
    assert_eq!(reserved.status(), StatusCode::CREATED);
    let reserved = body_json(reserved).await;
    assert_eq!(reserved["sequence"], 1);
    assert_eq!(reserved["reserved_reason"], "urgent pre-filing");

    // The reservation consumed sequence 1.
    let next = body_json(
        post_json(
            &app,
            "/v1/filings/issue",
            serde_json::json!({ "entity_id": id }),
        )
        .await,
    )
    .await;
    assert_eq!(next["sequence"], 2);
}

#[tokio::test]
async fn test_reserve_requires_reason() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;

    let response = post_json(
        &app,
        "/v1/filings/reserve",
        serde_json::json!({ "entity_id": id, "reason": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// -- Validation ---------------------------------------------------------------

#[tokio::test]
async fn test_validate_next_number_is_valid() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;
    post_json(
        &app,
        "/v1/filings/issue",
        serde_json::json!({ "entity_id": id }),
    )
    .await;

    let response = post_json(
        &app,
        "/v1/filings/validate",
        serde_json::json!({
            "entity_id": id,
            "number": format!("11001-0-{}-0002", current_yy())
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["valid"], true);
    assert!(body["stage"].is_null());
}

#[tokio::test]
async fn test_validate_rejects_bad_format() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;

    let response = post_json(
        &app,
        "/v1/filings/validate",
        serde_json::json!({ "entity_id": id, "number": "BAD-FORMAT" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["stage"], "FORMAT");
}

#[tokio::test]
async fn test_validate_rejects_issued_number_at_uniqueness() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;
    let issued = body_json(
        post_json(
            &app,
            "/v1/filings/issue",
            serde_json::json!({ "entity_id": id }),
        )
        .await,
    )
    .await;

    let response = post_json(
        &app,
        "/v1/filings/validate",
        serde_json::json!({ "entity_id": id, "number": issued["filing_number"] }),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["stage"], "UNIQUENESS");
}

#[tokio::test]
async fn test_validate_rejects_out_of_order_at_sequence() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;
    post_json(
        &app,
        "/v1/filings/issue",
        serde_json::json!({ "entity_id": id }),
    )
    .await;

    let response = post_json(
        &app,
        "/v1/filings/validate",
        serde_json::json!({
            "entity_id": id,
            "number": format!("11001-0-{}-0003", current_yy())
        }),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["stage"], "SEQUENCE");
    assert!(body["reason"].as_str().unwrap().contains("0002"));
}

#[tokio::test]
async fn test_validate_batch_preserves_order() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;
    post_json(
        &app,
        "/v1/filings/issue",
        serde_json::json!({ "entity_id": id }),
    )
    .await;
    let yy = current_yy();

    let response = post_json(
        &app,
        "/v1/filings/validate-batch",
        serde_json::json!({
            "entity_id": id,
            "numbers": [
                format!("11001-0-{yy}-0002"),
                "BAD-FORMAT",
                format!("11001-0-{yy}-0009"),
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["valid"], true);
    assert_eq!(results[1]["stage"], "FORMAT");
    assert_eq!(results[2]["stage"], "SEQUENCE");
}

#[tokio::test]
async fn test_validate_batch_rejects_empty() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;

    let response = post_json(
        &app,
        "/v1/filings/validate-batch",
        serde_json::json!({ "entity_id": id, "numbers": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// -- Audit --------------------------------------------------------------------

#[tokio::test]
async fn test_sequence_problems_empty_after_dense_issuance() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;
    for _ in 0..3 {
        post_json(
            &app,
            "/v1/filings/issue",
            serde_json::json!({ "entity_id": id }),
        )
        .await;
    }

    let response = get_path(&app, &format!("/v1/entities/{id}/sequence-problems")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_sequence_report_full_validity() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;
    for _ in 0..4 {
        post_json(
            &app,
            "/v1/filings/issue",
            serde_json::json!({ "entity_id": id }),
        )
        .await;
    }

    let response = get_path(&app, &format!("/v1/entities/{id}/sequence-report")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_filings"], 4);
    assert_eq!(body["valid_filings"], 4);
    assert_eq!(body["validity_percentage"], 100.0);
    assert_eq!(body["problems"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_sequence_report_explicit_empty_year() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;

    let response = get_path(
        &app,
        &format!("/v1/entities/{id}/sequence-report?year=2001"),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["total_filings"], 0);
    assert_eq!(body["validity_percentage"], 100.0);
}

#[tokio::test]
async fn test_sequence_problems_rejects_out_of_window_year() {
    let app = test_app();
    let id = register_entity(&app, "11001", "Secretaría de Planeación", None).await;

    let response = get_path(
        &app,
        &format!("/v1/entities/{id}/sequence-problems?year=1999"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_audit_unknown_entity_404() {
    let app = test_app();
    let response = get_path(
        &app,
        "/v1/entities/00000000-0000-0000-0000-000000000000/sequence-report",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_auth_rejects_missing_token() {
    let app = test_app_with_auth("s3cret");
    let response = get_path(&app, "/v1/entities").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_rejects_wrong_token() {
    let app = test_app_with_auth("s3cret");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/entities")
                .header("authorization", "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_accepts_correct_token() {
    let app = test_app_with_auth("s3cret");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/entities")
                .header("authorization", "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_auth_leaves_health_open() {
    let app = test_app_with_auth("s3cret");
    let response = get_path(&app, "/health/liveness").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_lists_core_paths() {
    let app = test_app();
    let response = get_path(&app, "/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/v1/filings/issue"));
    assert!(paths.contains_key("/v1/filings/validate-batch"));
    assert!(paths.contains_key("/v1/entities/{id}/sequence-report"));
}

// -- Malformed bodies ---------------------------------------------------------

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/filings/issue")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
