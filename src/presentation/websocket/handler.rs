//! WebSocket Connection Handler
//!
//! Drives one connection: handshake through the Auth Gate, then the event
//! loop until the client disconnects.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::auth_gate::{authenticate_text, HandshakeError};
use super::messages::{ClientEvent, EventError, ServerFrame};
use super::registry::{ConnectionRegistry, FrameSender};
use super::session::Connection;
use crate::application::services::{
    DirectMessageService, DirectMessageServiceImpl, MessageService, MessageServiceImpl,
};
use crate::domain::group_room;
use crate::infrastructure::metrics;
use crate::infrastructure::repositories::{
    PgDirectMessageRepository, PgGroupRepository, PgMessageRepository,
};
use crate::startup::AppState;

/// How long the writer may keep flushing after the event loop ends
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let limits = &state.settings.websocket;

    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    metrics::websocket_opened();

    let (mut sender, mut receiver) = socket.split();

    let handshake = timeout(
        state.settings.websocket.handshake_timeout(),
        next_text(&mut receiver),
    )
    .await;

    let result = match handshake {
        Ok(Some(text)) => authenticate_text(&text, &state.tokens),
        Ok(None) => {
            tracing::debug!("Connection closed before handshake");
            metrics::websocket_closed(false);
            return;
        }
        Err(_) => {
            tracing::debug!("Handshake timeout");
            Err(HandshakeError::AuthenticationFailed)
        }
    };

    let user_id = match result {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(reason = %e, "Handshake rejected");
            reject(&mut sender, e).await;
            metrics::websocket_closed(false);
            return;
        }
    };

    let connection = Connection::new(user_id);

    // Channel for outgoing frames; the writer task owns the sink
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerFrame>();

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize frame: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    state.registry.register(&connection, tx.clone());
    metrics::websocket_authenticated();
    let _ = tx.send(ServerFrame::connect(&connection.id, user_id));

    tracing::info!(
        connection_id = %connection.id,
        user_id = %user_id,
        "User connected"
    );

    let messages = MessageServiceImpl::new(
        Arc::new(PgGroupRepository::new(state.db.clone())),
        Arc::new(PgMessageRepository::new(state.db.clone())),
        state.registry.clone(),
        state.settings.database.query_timeout(),
    );
    let direct = DirectMessageServiceImpl::new(
        Arc::new(PgDirectMessageRepository::new(state.db.clone())),
        state.registry.clone(),
        state.settings.database.query_timeout(),
    );

    // Events of one connection are handled strictly in arrival order
    while let Some(msg) = receiver.next().await {
        let event = match msg {
            Ok(Message::Text(text)) => ClientEvent::from_text(text.as_str()),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(connection_id = %connection.id, error = %e, "WebSocket error");
                break;
            }
        };

        let flow = match event {
            Ok(event) => {
                dispatch(event, &connection, &state.registry, &messages, &direct, &tx).await
            }
            Err(e) => {
                tracing::debug!(connection_id = %connection.id, error = %e, "Rejected client frame");
                let _ = tx.send(ServerFrame::error(e));
                ControlFlow::Continue(())
            }
        };

        if flow.is_break() {
            break;
        }
    }

    // Cleanup
    state.registry.disconnect(connection.id);
    metrics::websocket_closed(true);
    drop(tx);

    if timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
        writer.abort();
    }

    tracing::info!(
        connection_id = %connection.id,
        user_id = %user_id,
        "User disconnected"
    );
}

/// Apply one validated client event.
///
/// Failures are reported to this connection only; the loop keeps running
/// unless the client asked to disconnect. Joins and leaves accept a group id
/// or a group name and always subscribe under the group's id.
pub async fn dispatch<S, D>(
    event: ClientEvent,
    connection: &Connection,
    registry: &ConnectionRegistry,
    messages: &S,
    direct: &D,
    outbound: &FrameSender,
) -> ControlFlow<()>
where
    S: MessageService + ?Sized,
    D: DirectMessageService + ?Sized,
{
    match event {
        ClientEvent::JoinGroup { room } => match messages.resolve_room(&room).await {
            Ok(Some(group_id)) => {
                let room = group_room(group_id);
                if registry.join(&room, connection.id) {
                    tracing::debug!(connection_id = %connection.id, room = %room, "Joined room");
                }
            }
            Ok(None) => {
                let _ = outbound.send(ServerFrame::error(EventError::GroupNotFound));
            }
            Err(e) => {
                let _ = outbound.send(ServerFrame::error(e));
            }
        },
        ClientEvent::LeaveGroup { room } => match messages.resolve_room(&room).await {
            Ok(Some(group_id)) => {
                let room = group_room(group_id);
                if registry.leave(&room, connection.id) {
                    tracing::debug!(connection_id = %connection.id, room = %room, "Left room");
                }
            }
            // Never joined, nothing to leave
            Ok(None) => {}
            Err(e) => {
                let _ = outbound.send(ServerFrame::error(e));
            }
        },
        ClientEvent::SendMessage(request) => {
            if let Err(e) = messages.send_message(connection.user_id, request).await {
                let _ = outbound.send(ServerFrame::error(e));
            }
        }
        ClientEvent::SendDirectMessage(request) => {
            if let Err(e) = direct.send_direct(connection.user_id, request).await {
                let _ = outbound.send(ServerFrame::error(e));
            }
        }
        ClientEvent::Disconnect => return ControlFlow::Break(()),
    }

    ControlFlow::Continue(())
}

/// Wait for the next text frame, skipping control frames.
async fn next_text(receiver: &mut SplitStream<WebSocket>) -> Option<String> {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => return Some(text.as_str().to_owned()),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
    None
}

/// Emit `connect_error` and close the transport.
async fn reject(sender: &mut SplitSink<WebSocket, Message>, reason: HandshakeError) {
    if let Ok(text) = serde_json::to_string(&ServerFrame::connect_error(&reason)) {
        let _ = sender.send(Message::Text(text.into())).await;
    }

    let _ = sender
        .send(Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: reason.to_string().into(),
        })))
        .await;
}
