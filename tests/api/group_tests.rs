//! Group API Tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::TestApp;

#[tokio::test]
async fn group_routes_require_a_bearer_token() {
    let app = TestApp::new();

    let response = app.server.get("/api/v1/group").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], 10003);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/group/join/algo101")
        .authorization_bearer("not-a-jwt")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Invalid token");
}

#[tokio::test]
async fn create_group_validates_name_before_storing() {
    let app = TestApp::new();
    let token = app.token();

    let response = app
        .server
        .post("/api/v1/group")
        .authorization_bearer(token)
        .json(&json!({ "name": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], 10007);
}

#[tokio::test]
async fn history_requires_a_uuid_group_id() {
    let app = TestApp::new();
    let token = app.token();

    let response = app
        .server
        .get("/api/v1/group/messages/not-a-uuid")
        .authorization_bearer(token)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uuid_shaped_group_name_is_rejected() {
    let app = TestApp::new();
    let token = app.token();

    let response = app
        .server
        .post("/api/v1/group")
        .authorization_bearer(token)
        .json(&json!({ "name": "0190c1b2-0000-7000-8000-000000000000" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["errors"][0]["message"],
        "Name must not be a UUID"
    );
}
