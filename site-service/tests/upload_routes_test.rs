//! Router-level tests for the image upload endpoints.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::Duration;
use tower::ServiceExt;

use common::test_state;
use site_service::build_router;
use site_service::handlers::upload::MAX_IMAGE_BYTES;

const BOUNDARY: &str = "x-test-boundary";

fn multipart_upload(
    uri: &str,
    token: &str,
    field: &str,
    content_type: &str,
    payload: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"photo.jpg\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn small_image_is_stored_and_gets_an_uploads_url() {
    let (state, sessions) = test_state();
    sessions.insert("upload-tok".to_string(), Duration::hours(1));
    let app = build_router(state);

    let response = app
        .oneshot(multipart_upload(
            "/api/upload",
            "upload-tok",
            "image",
            "image/jpeg",
            &[0xFF, 0xD8, 0xFF, 0xE0],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let url = parsed["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".jpg"));
}

#[tokio::test]
async fn image_over_the_per_file_limit_is_rejected() {
    let (state, sessions) = test_state();
    sessions.insert("upload-tok".to_string(), Duration::hours(1));
    let app = build_router(state);

    // One byte past the cap: the request body itself is well under the
    // whole-batch body limit, so only the per-image check can reject it.
    let oversized = vec![0u8; MAX_IMAGE_BYTES + 1];
    let response = app
        .oneshot(multipart_upload(
            "/api/upload",
            "upload-tok",
            "image",
            "image/jpeg",
            &oversized,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_image_content_type_is_rejected() {
    let (state, sessions) = test_state();
    sessions.insert("upload-tok".to_string(), Duration::hours(1));
    let app = build_router(state);

    let response = app
        .oneshot(multipart_upload(
            "/api/upload",
            "upload-tok",
            "image",
            "application/pdf",
            b"%PDF-1.4",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_requires_an_admin_session() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(multipart_upload(
            "/api/upload",
            "never-issued",
            "image",
            "image/jpeg",
            &[0xFF, 0xD8],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
