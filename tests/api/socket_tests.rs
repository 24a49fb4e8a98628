//! WebSocket Gateway Tests
//!
//! Drive `/socket` over a real loopback connection. Only flows that never
//! reach the database are covered here.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use crate::common::{spawn_server, test_settings, TestApp};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const QUIET: Duration = Duration::from_millis(300);

async fn open(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/socket"))
        .await
        .expect("websocket upgrade");
    socket
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::text(value.to_string()))
        .await
        .expect("send frame");
}

/// Next text frame as JSON, skipping control frames.
async fn next_json(socket: &mut Socket) -> Value {
    let deadline = Duration::from_secs(5);
    loop {
        let msg = timeout(deadline, socket.next())
            .await
            .expect("frame before deadline")
            .expect("stream open")
            .expect("valid frame");
        match msg {
            Message::Text(text) => return serde_json::from_str(text.as_str()).expect("json frame"),
            Message::Close(frame) => panic!("closed while waiting for a frame: {frame:?}"),
            _ => continue,
        }
    }
}

/// Wait until `condition` holds, failing after two seconds.
async fn eventually(condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        sleep(Duration::from_millis(20)).await;
    }
}

async fn authenticated(addr: SocketAddr) -> (Socket, Value) {
    let token = TestApp::token_for(Uuid::new_v4());
    let mut socket = open(addr).await;
    send_json(&mut socket, json!({ "token": token })).await;
    let connect = next_json(&mut socket).await;
    (socket, connect)
}

#[tokio::test]
async fn handshake_without_token_is_rejected_and_closed() {
    let (addr, state) = spawn_server(test_settings()).await;
    let mut socket = open(addr).await;

    send_json(&mut socket, json!({})).await;

    let rejected = next_json(&mut socket).await;
    assert_eq!(rejected["event"], "connect_error");
    assert_eq!(rejected["args"][0]["message"], "Token required");

    match timeout(Duration::from_secs(5), socket.next()).await {
        Ok(Some(Ok(Message::Close(Some(frame))))) => {
            assert_eq!(frame.code, CloseCode::Policy);
            assert_eq!(frame.reason.as_str(), "Token required");
        }
        other => panic!("expected a policy close, got {other:?}"),
    }

    // Anything sent after the rejection goes unanswered
    let _ = socket
        .send(Message::text(
            json!({ "event": "join_group", "args": [Uuid::new_v4().to_string()] }).to_string(),
        ))
        .await;
    let after = timeout(QUIET, socket.next()).await;
    assert!(
        !matches!(after, Ok(Some(Ok(Message::Text(_))))),
        "unexpected reply after rejection: {after:?}"
    );
    assert_eq!(state.registry.connection_count(), 0);
    assert_eq!(state.registry.room_count(), 0);
}

#[tokio::test]
async fn garbage_token_is_invalid() {
    let (addr, _) = spawn_server(test_settings()).await;
    let mut socket = open(addr).await;

    send_json(&mut socket, json!({ "token": "not-a-jwt" })).await;

    let rejected = next_json(&mut socket).await;
    assert_eq!(rejected["event"], "connect_error");
    assert_eq!(rejected["args"][0]["message"], "Invalid token");
}

#[tokio::test]
async fn silent_client_is_rejected_after_the_handshake_timeout() {
    let mut settings = test_settings();
    settings.websocket.handshake_timeout_secs = 1;
    let (addr, _) = spawn_server(settings).await;
    let mut socket = open(addr).await;

    let rejected = next_json(&mut socket).await;

    assert_eq!(rejected["event"], "connect_error");
    assert_eq!(rejected["args"][0]["message"], "Authentication failed");
}

#[tokio::test]
async fn valid_token_connects_and_close_unregisters() {
    let (addr, state) = spawn_server(test_settings()).await;
    let user_id = Uuid::new_v4();
    let mut socket = open(addr).await;

    send_json(&mut socket, json!({ "token": TestApp::token_for(user_id) })).await;

    let connect = next_json(&mut socket).await;
    assert_eq!(connect["event"], "connect");
    assert_eq!(connect["args"][0]["user_id"], user_id.to_string());
    assert_eq!(state.registry.connection_count(), 1);

    let group_id = Uuid::new_v4();
    send_json(
        &mut socket,
        json!({ "event": "join_group", "args": [group_id.to_string()] }),
    )
    .await;
    eventually(|| state.registry.subscriber_count(&group_id.to_string()) == 1).await;

    socket.close(None).await.expect("close");

    eventually(|| state.registry.connection_count() == 0).await;
    assert_eq!(state.registry.room_count(), 0);
}

#[tokio::test]
async fn malformed_events_get_error_frames_and_keep_the_connection() {
    let (addr, state) = spawn_server(test_settings()).await;
    let (mut socket, _) = authenticated(addr).await;

    send_json(&mut socket, json!({ "event": "join_group", "args": [42] })).await;
    let error = next_json(&mut socket).await;
    assert_eq!(error, json!({ "event": "error", "args": ["invalid group id"] }));

    send_json(&mut socket, json!({ "event": "typing", "args": [] })).await;
    let error = next_json(&mut socket).await;
    assert_eq!(error["args"][0], "unknown event");

    send_json(
        &mut socket,
        json!({ "event": "send_direct_message", "args": [{ "recipient_id": "bob", "content": "hi" }] }),
    )
    .await;
    let error = next_json(&mut socket).await;
    assert_eq!(error["args"][0], "invalid recipient id");

    assert_eq!(state.registry.connection_count(), 1);
}

#[tokio::test]
async fn disconnect_event_closes_the_session() {
    let (addr, state) = spawn_server(test_settings()).await;
    let (mut socket, _) = authenticated(addr).await;
    assert_eq!(state.registry.connection_count(), 1);

    send_json(&mut socket, json!({ "event": "disconnect" })).await;

    eventually(|| state.registry.connection_count() == 0).await;
}
