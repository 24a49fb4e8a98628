//! WebSocket Connection Identity

use uuid::Uuid;

/// Unique identifier for one WebSocket connection.
///
/// Generated server-side on upgrade; a user with two tabs open holds two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authenticated connection. The user id is fixed for its lifetime.
#[derive(Debug, Clone, Copy)]
pub struct Connection {
    pub id: ConnectionId,
    pub user_id: Uuid,
}

impl Connection {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
        }
    }
}
