//! API surface tests: page, probes, middleware.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::support::*;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = router(FakeHost::serving("https://utfs.io/f/x"), FakeDetector::returning(pets()));

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_when_configured() {
    let app = router(FakeHost::serving("https://utfs.io/f/x"), FakeDetector::returning(pets()));

    let response = app.oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_ready_degraded_without_secrets() {
    let app = router(
        FakeHost::new(HostMode::NoCredentials),
        FakeDetector::returning(pets()),
    );

    let response = app.oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["hosting"]["status"], "error");
    assert_eq!(body["checks"]["detector"]["status"], "ok");
}

#[tokio::test]
async fn test_index_serves_upload_form() {
    let app = router(FakeHost::serving("https://utfs.io/f/x"), FakeDetector::returning(pets()));

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains(r#"name="files""#));
    assert!(html.contains("/api/detect-objects"));
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let app = router(FakeHost::serving("https://utfs.io/f/x"), FakeDetector::returning(pets()));

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = router(FakeHost::serving("https://utfs.io/f/x"), FakeDetector::returning(pets()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = router(FakeHost::serving("https://utfs.io/f/x"), FakeDetector::returning(pets()));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/detect-objects")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status() == StatusCode::OK || response.status() == StatusCode::NO_CONTENT);
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_rate_limit_applies_per_client_ip() {
    let app = router(FakeHost::serving("https://utfs.io/f/x"), FakeDetector::returning(pets()));
    let mut limited = false;

    for _ in 0..20 {
        let mut request = jpeg_upload();
        request
            .headers_mut()
            .insert("x-forwarded-for", "192.0.2.10".parse().unwrap());

        let response = app.clone().oneshot(request).await.unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            assert_eq!(response.headers()["retry-after"], "1");
            let body = json_body(response).await;
            assert_eq!(body["error"], "Too Many Requests");
            assert!(!body["details"].as_str().unwrap().is_empty());
            assert_eq!(body.as_object().unwrap().len(), 2);
            limited = true;
            break;
        }
    }

    assert!(limited);
}
