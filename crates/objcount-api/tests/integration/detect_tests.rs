//! Detection endpoint tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use objcount_models::Detection;
use serde_json::json;
use tower::ServiceExt;

use super::support::*;

#[tokio::test]
async fn test_detects_and_counts_confident_labels() {
    let host = FakeHost::serving("https://utfs.io/f/abc123");
    let detector = FakeDetector::returning(pets());
    let app = router(host.clone(), detector.clone());

    let response = app.oneshot(jpeg_upload()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({"url": "https://utfs.io/f/abc123", "label": {"cat": 1, "dog": 1}})
    );
    assert_eq!(host.calls(), 1);
    assert_eq!(detector.last_url().as_deref(), Some("https://utfs.io/f/abc123"));
}

#[tokio::test]
async fn test_no_confident_detections_returns_empty_map() {
    let host = FakeHost::serving("https://utfs.io/f/abc123");
    let detector = FakeDetector::returning(vec![
        Detection::new("cat", 0.85),
        Detection::new("dog", 0.12),
    ]);
    let app = router(host, detector);

    let response = app.oneshot(jpeg_upload()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, json!({"url": "https://utfs.io/f/abc123", "label": {}}));
}

#[tokio::test]
async fn test_host_failure_returns_500_without_detection() {
    let host = FakeHost::new(HostMode::Throws);
    let detector = FakeDetector::returning(pets());
    let app = router(host, detector.clone());

    let response = app.oneshot(jpeg_upload()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal Server Error");
    assert!(!body["details"].as_str().unwrap().is_empty());
    assert_eq!(body.as_object().unwrap().len(), 2);
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_empty_url_returns_500_without_detection() {
    let host = FakeHost::new(HostMode::EmptyUrl);
    let detector = FakeDetector::returning(pets());
    let app = router(host, detector.clone());

    let response = app.oneshot(jpeg_upload()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({
            "error": "Internal Server Error",
            "details": "Failed to retrieve URL from upload response."
        })
    );
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_missing_secrets_fail_before_any_call() {
    let host = FakeHost::new(HostMode::NoCredentials);
    let detector = FakeDetector::returning(pets());
    let app = router(host.clone(), detector.clone());

    let response = app.oneshot(jpeg_upload()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["details"], "Missing API key or app ID.");
    assert_eq!(host.calls(), 0);
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_detection_failure_returns_500() {
    let host = FakeHost::serving("https://utfs.io/f/abc123");
    let detector = FakeDetector::failing();
    let app = router(host, detector.clone());

    let response = app.oneshot(jpeg_upload()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["details"].as_str().unwrap().contains("currently loading"));
    assert_eq!(detector.calls(), 1);
}

#[tokio::test]
async fn test_non_multipart_body_is_uniform_500() {
    let host = FakeHost::serving("https://utfs.io/f/abc123");
    let detector = FakeDetector::returning(pets());
    let app = router(host.clone(), detector);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/detect-objects")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(host.calls(), 0);
}

#[tokio::test]
async fn test_no_files_field_fails_without_detection() {
    let host = FakeHost::serving("https://utfs.io/f/abc123");
    let detector = FakeDetector::returning(pets());
    let app = router(host, detector.clone());

    let body = multipart_body(&[("avatar", "cat.jpg", &b"\xFF\xD8"[..])]);
    let response = app.oneshot(detect_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["details"], "Failed to retrieve URL from upload response.");
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_multiple_files_use_first_url() {
    let host = FakeHost::serving("https://utfs.io/f/abc123");
    let detector = FakeDetector::returning(pets());
    let app = router(host.clone(), detector.clone());

    let body = multipart_body(&[
        ("files", "first.jpg", &b"\xFF\xD8\x01"[..]),
        ("files", "second.jpg", &b"\xFF\xD8\x02"[..]),
    ]);
    let response = app.oneshot(detect_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(host.calls(), 1);
    assert_eq!(detector.calls(), 1);
}

fn oversized_upload() -> Request<Body> {
    let image = vec![0xABu8; 17 * 1024 * 1024];
    let body = multipart_body(&[("files", "huge.jpg", &image[..])]);
    let mut request = detect_request(body.clone());
    request
        .headers_mut()
        .insert("content-length", body.len().to_string().parse().unwrap());
    request
}

#[tokio::test]
async fn test_oversized_body_returns_error_body() {
    let host = FakeHost::serving("https://utfs.io/f/abc123");
    let detector = FakeDetector::returning(pets());
    let app = router(host.clone(), detector.clone());

    let response = app.oneshot(oversized_upload()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal Server Error");
    assert!(!body["details"].as_str().unwrap().is_empty());
    assert_eq!(body.as_object().unwrap().len(), 2);
    assert_eq!(host.calls(), 0);
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_oversized_body_still_reports_missing_secrets() {
    let app = router(
        FakeHost::new(HostMode::NoCredentials),
        FakeDetector::returning(pets()),
    );

    let response = app.oneshot(oversized_upload()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["details"], "Missing API key or app ID.");
}
