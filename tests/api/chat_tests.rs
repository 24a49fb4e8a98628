//! Direct Chat API Tests

use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::TestApp;

#[tokio::test]
async fn chat_routes_require_a_bearer_token() {
    let app = TestApp::new();
    let peer = Uuid::new_v4();

    let send = app
        .server
        .post("/api/v1/chat/send")
        .json(&json!({ "recipient_id": peer, "content": "hi" }))
        .await;
    let history = app.server.get(&format!("/api/v1/chat/history/{peer}")).await;

    assert_eq!(send.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(history.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_direct_message_is_rejected_before_storing() {
    let app = TestApp::new();
    let token = app.token();

    let response = app
        .server
        .post("/api/v1/chat/send")
        .authorization_bearer(token)
        .json(&json!({ "recipient_id": Uuid::new_v4(), "content": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "content");
}

#[tokio::test]
async fn message_to_yourself_is_a_bad_request() {
    let app = TestApp::new();
    let me = Uuid::new_v4();

    let response = app
        .server
        .post("/api/v1/chat/send")
        .authorization_bearer(TestApp::token_for(me))
        .json(&json!({ "recipient_id": me, "content": "note to self" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "cannot send a message to yourself"
    );
}

#[tokio::test]
async fn history_requires_a_uuid_peer() {
    let app = TestApp::new();
    let token = app.token();

    let response = app
        .server
        .get("/api/v1/chat/history/bob")
        .authorization_bearer(token)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
