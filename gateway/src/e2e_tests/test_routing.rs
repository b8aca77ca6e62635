//! End-to-end tests for route wiring.
//!
//! These tests verify:
//! 1. Each credential only opens its own route group
//! 2. Unknown paths are not treated as auth failures
//! 3. CORS preflight requests are answered before auth, mirroring the
//!    origin and allowing credentials and the API-key header

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};

use crate::e2e_tests::helpers::TestGateway;
use crate::router::{LOGIN_PATH, SERVICE_INFO_PATH};

#[tokio::test]
async fn test_api_key_does_not_open_service_info() {
    let gateway = TestGateway::new();
    let request = Request::builder()
        .method("GET")
        .uri(SERVICE_INFO_PATH)
        .header("X-API-Key", "key123")
        .body(Body::empty())
        .expect("build request");

    let (status, body) = gateway.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "bearer format is not correct");
}

#[tokio::test]
async fn test_token_does_not_open_login() {
    let gateway = TestGateway::new();
    let token = gateway.token_for("bob").await;
    let request = Request::builder()
        .method("POST")
        .uri(LOGIN_PATH)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"Account":"bob","Password":"pw"}"#))
        .expect("build request");

    let (status, body) = gateway.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "no such API-Key, authentication failed");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let gateway = TestGateway::new();
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/unknown")
        .body(Body::empty())
        .expect("build request");

    let (status, _) = gateway.send(request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight_for_login() {
    let gateway = TestGateway::new();
    let request = Request::builder()
        .method("OPTIONS")
        .uri(LOGIN_PATH)
        .header(header::ORIGIN, "https://console.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-api-key")
        .body(Body::empty())
        .expect("build request");

    let response = gateway.respond(request).await;
    let headers = response.headers();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("allow-origin header"),
        "https://console.example.com"
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .expect("allow-credentials header"),
        "true"
    );

    let allowed_headers = headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .expect("allow-headers header")
        .to_str()
        .expect("ascii header")
        .to_ascii_lowercase();
    for name in ["x-api-key", "authorization", "content-type"] {
        assert!(
            allowed_headers.contains(name),
            "{name} missing from {allowed_headers}"
        );
    }

    let allowed_methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .expect("allow-methods header")
        .to_str()
        .expect("ascii header");
    assert!(allowed_methods.contains("POST"), "methods: {allowed_methods}");
}

#[tokio::test]
async fn test_tokens_from_two_logins_both_work() {
    let gateway = TestGateway::new();
    let bob = gateway.token_for("bob").await;
    let carol = gateway.token_for("carol").await;

    for token in [bob, carol] {
        let (status, _) = gateway.service_info(Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
    }
}
