//! Authentication API Tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::TestApp;

#[tokio::test]
async fn register_with_invalid_email_is_rejected() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "ada",
            "email": "not-an-email",
            "password": "ValidPassword123!"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], 10007);
    assert!(body["message"].as_str().unwrap().starts_with("email"));
    assert_eq!(
        body["errors"],
        json!([{ "field": "email", "message": "Invalid email format" }])
    );
}

#[tokio::test]
async fn register_with_short_password_is_rejected() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "ada",
            "email": "ada@uni.edu",
            "password": "short"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_malformed_email_is_rejected() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "ada", "password": "ValidPassword123!" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
