//! Liveness endpoint and the middleware every response passes through.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, get};
use homegate_core::state::StatusStore;
use tower::ServiceExt;

fn app() -> axum::Router {
    build_test_app(Arc::new(StatusStore::new()))
}

#[tokio::test]
async fn health_reports_ok_and_version() {
    let response = get(app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn unmatched_path_is_not_found() {
    let response = get(app(), "/devices").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// Request ids come from MakeRequestUuid, so they are hyphenated UUIDs.
#[tokio::test]
async fn every_response_carries_request_id() {
    for path in ["/health", "/status", "/devices"] {
        let response = get(app(), path).await;
        let id = response
            .headers()
            .get("x-request-id")
            .unwrap_or_else(|| panic!("no request id on {path}"))
            .to_str()
            .unwrap();
        assert_eq!(id.len(), 36, "{path}: {id}");
    }
}

#[tokio::test]
async fn preflight_from_configured_origin_allows_get() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/status")
        .header("Origin", "http://localhost:8000")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:8000");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("GET"), "allowed: {methods}");
}
