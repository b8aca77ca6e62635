//! End-to-end tests for `POST /api/v1/login`.
//!
//! These tests verify:
//! 1. A known API key plus a well-formed body yields a token
//! 2. Unknown, missing or near-miss API keys are rejected with 401
//! 3. Credential file problems surface as 500
//! 4. Body and account failures surface as 400 with a message
//! 5. Bodies up to the configured limit are accepted

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode, header},
};
use serde_json::json;

use crate::auth::jwt;
use crate::e2e_tests::helpers::{CREDENTIALS, RejectingAuthenticator, TestGateway, test_secret};
use crate::router::{LOGIN_PATH, MAX_BODY_BYTES};

#[tokio::test]
async fn test_login_with_known_key_returns_token() {
    let gateway = TestGateway::with_credentials(r#"{"alice":"key123"}"#);

    let (status, body) = gateway.login("key123", "bob").await;

    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token string");
    assert!(!token.is_empty());

    let claims = jwt::verify_token(token, &test_secret()).expect("token verifies");
    assert_eq!(claims.account, "bob");
    assert_eq!(claims.role, "Member");
    assert_eq!(claims.iss, "JWT");
}

#[tokio::test]
async fn test_login_with_second_client_key() {
    let gateway = TestGateway::new();
    let (status, _) = gateway.login("key456", "carol").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_wrong_key() {
    let gateway = TestGateway::with_credentials(r#"{"alice":"key123"}"#);

    let (status, body) = gateway.login("wrongkey", "bob").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "error": "no such API-Key, authentication failed" })
    );
}

#[tokio::test]
async fn test_login_key_match_is_exact() {
    let gateway = TestGateway::new();

    for presented in ["KEY123", "key12", "key1234", "alice"] {
        let (status, _) = gateway.login(presented, "bob").await;
        assert_eq!(
            status,
            StatusCode::UNAUTHORIZED,
            "key {presented:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_login_without_key() {
    let gateway = TestGateway::new();
    let body = json!({ "Account": "bob", "Password": "pw" }).to_string();

    let (status, body) = gateway.login_raw(None, &body).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "no such API-Key, authentication failed");
}

#[tokio::test]
async fn test_login_with_missing_credential_file() {
    let gateway = TestGateway::new();
    std::fs::remove_file(&gateway.key_file).expect("remove credential file");

    let (status, body) = gateway.login("key123", "bob").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "API-Key process failed, please connect admin." })
    );
}

#[tokio::test]
async fn test_login_with_malformed_credential_file() {
    let gateway = TestGateway::with_credentials(r#"{"alice": ["key123"]}"#);

    let (status, _) = gateway.login("key123", "bob").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_login_sees_revoked_key() {
    let gateway = TestGateway::new();
    let (status, _) = gateway.login("key456", "carol").await;
    assert_eq!(status, StatusCode::OK);

    std::fs::write(&gateway.key_file, r#"{"alice":"key123"}"#).expect("rewrite credential file");

    let (status, _) = gateway.login("key456", "carol").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_invalid_json_body() {
    let gateway = TestGateway::new();

    let (status, body) = gateway.login_raw(Some("key123"), "{\"Account\":").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().expect("message string");
    assert!(
        message.starts_with("Client alice bad request: "),
        "unexpected message: {message}"
    );
}

#[tokio::test]
async fn test_login_with_missing_password() {
    let gateway = TestGateway::new();

    let (status, body) = gateway
        .login_raw(Some("key123"), r#"{"Account":"bob"}"#)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().expect("message string");
    assert!(message.contains("Password"), "unexpected message: {message}");
}

#[tokio::test]
async fn test_login_with_lowercase_field_names() {
    let gateway = TestGateway::new();

    let (status, _) = gateway
        .login_raw(Some("key123"), r#"{"account":"bob","password":"pw"}"#)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejected_by_authenticator() {
    let authenticator = Arc::new(RejectingAuthenticator::default());
    let gateway = TestGateway::with_authenticator(CREDENTIALS, authenticator.clone());

    let (status, body) = gateway.login("key123", "bob").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "message": "Account bob auth blockchain CA failed." })
    );
    assert_eq!(authenticator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_login_bad_key_never_reaches_authenticator() {
    let authenticator = Arc::new(RejectingAuthenticator::default());
    let gateway = TestGateway::with_authenticator(CREDENTIALS, authenticator.clone());

    let (status, _) = gateway.login("wrongkey", "bob").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(authenticator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_with_non_ascii_key() {
    let gateway = TestGateway::with_credentials(r#"{"alice":"clé"}"#);
    let request = Request::builder()
        .method("POST")
        .uri(LOGIN_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            "X-API-Key",
            HeaderValue::from_bytes("clé".as_bytes()).expect("opaque header value"),
        )
        .body(Body::from(r#"{"Account":"bob","Password":"pw"}"#))
        .expect("build request");

    let (status, body) = gateway.send(request).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert!(body["token"].as_str().is_some_and(|token| !token.is_empty()));
}

fn login_body_of_size(size: usize) -> String {
    let envelope = r#"{"Account":"bob","Password":""}"#;
    let password = "x".repeat(size - envelope.len());
    json!({ "Account": "bob", "Password": password }).to_string()
}

#[tokio::test]
async fn test_login_with_body_above_axum_default_limit() {
    let gateway = TestGateway::new();
    let body = login_body_of_size(3 << 20);

    let (status, body) = gateway.login_raw(Some("key123"), &body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_login_with_body_over_limit() {
    let gateway = TestGateway::new();
    let body = login_body_of_size(MAX_BODY_BYTES + (1 << 20));

    let (status, body) = gateway.login_raw(Some("key123"), &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().expect("message string");
    assert!(
        message.starts_with("Client alice bad request: "),
        "unexpected message: {message}"
    );
    assert!(
        message.contains("length limit exceeded"),
        "unexpected message: {message}"
    );
}
