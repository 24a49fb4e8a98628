//! WebSocket Message Types
//!
//! Every frame is a JSON text frame shaped `{"event": <name>, "args": [..]}`.
//! The first client frame is the handshake map instead, e.g. `{"token": ".."}`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::session::ConnectionId;
use crate::application::services::{SendDirectDto, SendMessageDto};
use crate::domain::{DirectMessage, GroupMessage};

/// Server event names
pub mod event {
    pub const CONNECT: &str = "connect";
    pub const CONNECT_ERROR: &str = "connect_error";
    pub const ERROR: &str = "error";
    pub const NEW_MESSAGE: &str = "new_message";
    pub const NEW_DIRECT_MESSAGE: &str = "new_direct_message";
}

/// Incoming event frame
#[derive(Debug, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Outgoing event frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerFrame {
    pub event: &'static str,
    pub args: Vec<Value>,
}

impl ServerFrame {
    /// Handshake accepted
    pub fn connect(connection_id: &ConnectionId, user_id: Uuid) -> Self {
        Self {
            event: event::CONNECT,
            args: vec![json!({
                "connection_id": connection_id.to_string(),
                "user_id": user_id,
            })],
        }
    }

    /// Handshake rejected; always followed by a close
    pub fn connect_error(reason: impl std::fmt::Display) -> Self {
        Self {
            event: event::CONNECT_ERROR,
            args: vec![json!({ "message": reason.to_string() })],
        }
    }

    /// Per-event failure, sent to the originating connection only
    pub fn error(reason: impl std::fmt::Display) -> Self {
        Self {
            event: event::ERROR,
            args: vec![Value::String(reason.to_string())],
        }
    }

    /// A persisted group message
    pub fn new_message(message: &GroupMessage) -> Self {
        Self {
            event: event::NEW_MESSAGE,
            args: vec![serde_json::to_value(message).unwrap_or_default()],
        }
    }

    /// A persisted direct message, sent to both participants
    pub fn new_direct_message(message: &DirectMessage) -> Self {
        Self {
            event: event::NEW_DIRECT_MESSAGE,
            args: vec![serde_json::to_value(message).unwrap_or_default()],
        }
    }
}

/// Payload validation failures. `Display` is the text of the `error` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("invalid group id")]
    InvalidGroupId,

    #[error("group not found")]
    GroupNotFound,

    #[error("invalid recipient id")]
    InvalidRecipientId,

    #[error("invalid payload")]
    InvalidPayload,

    #[error("unknown event")]
    UnknownEvent,
}

/// A validated client event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    JoinGroup { room: String },
    LeaveGroup { room: String },
    SendMessage(SendMessageDto),
    SendDirectMessage(SendDirectDto),
    Disconnect,
}

impl ClientEvent {
    /// Decode a raw text frame.
    pub fn from_text(text: &str) -> Result<Self, EventError> {
        let frame: ClientFrame =
            serde_json::from_str(text).map_err(|_| EventError::InvalidPayload)?;
        Self::parse(frame)
    }

    /// Validate the arguments of a decoded frame.
    pub fn parse(frame: ClientFrame) -> Result<Self, EventError> {
        let first = frame.args.into_iter().next();

        match frame.event.as_str() {
            "join_group" => Ok(Self::JoinGroup {
                room: room_arg(first.as_ref())?,
            }),
            "leave_group" => Ok(Self::LeaveGroup {
                room: room_arg(first.as_ref())?,
            }),
            "send_message" => send_message_arg(first).map(Self::SendMessage),
            "send_direct_message" => send_direct_arg(first).map(Self::SendDirectMessage),
            "disconnect" => Ok(Self::Disconnect),
            _ => Err(EventError::UnknownEvent),
        }
    }
}

/// A room argument must be a non-empty string.
fn room_arg(value: Option<&Value>) -> Result<String, EventError> {
    match value {
        Some(Value::String(room)) if !room.is_empty() => Ok(room.clone()),
        _ => Err(EventError::InvalidGroupId),
    }
}

fn send_message_arg(value: Option<Value>) -> Result<SendMessageDto, EventError> {
    let Some(Value::Object(mut payload)) = value else {
        return Err(EventError::InvalidPayload);
    };

    let content = match payload.remove("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(content)) => content,
        Some(_) => return Err(EventError::InvalidPayload),
    };

    let media_url = match payload.remove("media_url") {
        None | Some(Value::Null) => None,
        Some(Value::String(url)) => Some(url),
        Some(_) => return Err(EventError::InvalidPayload),
    };

    let room = room_arg(payload.get("group_id"))?;

    Ok(SendMessageDto {
        room,
        content,
        media_url,
    })
}

fn send_direct_arg(value: Option<Value>) -> Result<SendDirectDto, EventError> {
    let Some(Value::Object(mut payload)) = value else {
        return Err(EventError::InvalidPayload);
    };

    let content = match payload.remove("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(content)) => content,
        Some(_) => return Err(EventError::InvalidPayload),
    };

    let recipient_id = match payload.get("recipient_id") {
        Some(Value::String(id)) => {
            Uuid::parse_str(id).map_err(|_| EventError::InvalidRecipientId)?
        }
        _ => return Err(EventError::InvalidRecipientId),
    };

    Ok(SendDirectDto {
        recipient_id,
        content,
    })
}
