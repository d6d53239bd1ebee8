//! Router-level tests for the session endpoints and the admin guard.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::Duration;
use tower::ServiceExt;

use common::test_state;
use site_service::build_router;

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn verify_token_rejects_missing_and_unknown_tokens() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(json_post("/api/auth/verify-token", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_post(
            "/api/auth/verify-token",
            serde_json::json!({ "token": "deadbeef" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["valid"], false);
}

#[tokio::test]
async fn verify_token_accepts_a_registered_session() {
    let (state, sessions) = test_state();
    sessions.insert("tok123".to_string(), Duration::hours(1));
    let app = build_router(state);

    let response = app
        .oneshot(json_post(
            "/api/auth/verify-token",
            serde_json::json!({ "token": "tok123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["valid"], true);
}

#[tokio::test]
async fn logout_revokes_the_session_and_stays_idempotent() {
    let (state, sessions) = test_state();
    sessions.insert("tok456".to_string(), Duration::hours(1));
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(json_post(
            "/api/auth/logout",
            serde_json::json!({ "token": "tok456" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!sessions.is_valid("tok456"));

    // Logging out again, or without a token, still succeeds.
    let response = app
        .clone()
        .oneshot(json_post(
            "/api/auth/logout",
            serde_json::json!({ "token": "tok456" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_post("/api/auth/logout", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn verify_code_rejects_wrong_length_before_touching_storage() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(json_post(
            "/api/auth/verify-code",
            serde_json::json!({ "code": "123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_routes_require_a_bearer_token() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(json_post("/api/creations", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/creations")
        .header(header::AUTHORIZATION, "Bearer not-a-session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_listing_routes_are_not_guarded() {
    let (state, sessions) = test_state();
    sessions.insert("tok789".to_string(), Duration::hours(1));
    let app = build_router(state);

    // GET on a path whose mutations are admin-only must not be rejected by
    // the guard. It fails later on the unreachable database instead.
    let request = Request::builder()
        .method("GET")
        .uri("/api/creations")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
