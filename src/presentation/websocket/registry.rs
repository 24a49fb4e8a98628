//! Connection Registry
//!
//! Tracks which authenticated connections are subscribed to which rooms and
//! fans frames out to them. Group rooms are keyed by group id; direct
//! messages go to every connection of a user instead of through a room.
//!
//! ```text
//! Room: 0190c1b2-...      User: 4be1...
//! ├── conn-a              ├── conn-a
//! └── conn-b              └── conn-d
//! ```
//!
//! One mutex guards every index. It is held for map work
//! and the non-blocking channel sends of a delivery, never across an await,
//! so per-room deliveries are observed in the order they were issued.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::ServerFrame;
use super::session::{Connection, ConnectionId};
use crate::domain::{group_room, DirectBroadcaster, DirectMessage, GroupMessage, RoomBroadcaster};
use crate::infrastructure::metrics;

/// Outbound half of a connection's writer channel
pub type FrameSender = mpsc::UnboundedSender<ServerFrame>;

struct ConnectedClient {
    user_id: Uuid,
    rooms: HashSet<String>,
    sender: FrameSender,
}

#[derive(Default)]
struct RegistryState {
    /// room -> subscribed connections
    rooms: HashMap<String, HashSet<ConnectionId>>,
    /// connection -> identity, rooms and outbound channel
    connections: HashMap<ConnectionId, ConnectedClient>,
    /// user -> their live connections
    users: HashMap<Uuid, HashSet<ConnectionId>>,
}

/// In-memory room membership for live connections.
#[derive(Default)]
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an authenticated connection known. It starts in no rooms.
    pub fn register(&self, connection: &Connection, sender: FrameSender) {
        let mut state = self.state.lock();
        state.connections.insert(
            connection.id,
            ConnectedClient {
                user_id: connection.user_id,
                rooms: HashSet::new(),
                sender,
            },
        );
        state
            .users
            .entry(connection.user_id)
            .or_default()
            .insert(connection.id);
        drop(state);

        tracing::debug!(
            connection_id = %connection.id,
            user_id = %connection.user_id,
            "Connection registered"
        );
    }

    /// Subscribe a connection to a room.
    ///
    /// Idempotent. Returns `false` if the connection was already subscribed
    /// or is not registered.
    pub fn join(&self, room: &str, connection_id: ConnectionId) -> bool {
        let mut state = self.state.lock();
        let RegistryState {
            rooms, connections, ..
        } = &mut *state;

        let Some(client) = connections.get_mut(&connection_id) else {
            return false;
        };

        if !client.rooms.insert(room.to_string()) {
            return false;
        }

        rooms
            .entry(room.to_string())
            .or_default()
            .insert(connection_id);
        true
    }

    /// Unsubscribe a connection from one room. Returns `false` if it was not subscribed.
    pub fn leave(&self, room: &str, connection_id: ConnectionId) -> bool {
        let mut state = self.state.lock();
        let RegistryState {
            rooms, connections, ..
        } = &mut *state;

        let removed = connections
            .get_mut(&connection_id)
            .is_some_and(|client| client.rooms.remove(room));

        if removed {
            remove_subscriber(rooms, room, connection_id);
        }
        removed
    }

    /// Forget a connection and drop it from every room it was in.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock();
        let RegistryState {
            rooms,
            connections,
            users,
        } = &mut *state;

        let Some(client) = connections.remove(&connection_id) else {
            return;
        };

        for room in &client.rooms {
            remove_subscriber(rooms, room, connection_id);
        }

        if let Some(sessions) = users.get_mut(&client.user_id) {
            sessions.remove(&connection_id);
            if sessions.is_empty() {
                users.remove(&client.user_id);
            }
        }

        tracing::debug!(
            connection_id = %connection_id,
            user_id = %client.user_id,
            rooms = client.rooms.len(),
            "Connection unregistered"
        );
    }

    /// Send a frame to every current subscriber of `room`.
    ///
    /// Best effort: a subscriber whose writer is gone is skipped. Returns the
    /// number of subscribers the frame was handed to.
    pub fn deliver(&self, room: &str, frame: &ServerFrame) -> usize {
        let state = self.state.lock();

        let Some(subscribers) = state.rooms.get(room) else {
            return 0;
        };

        subscribers
            .iter()
            .filter_map(|id| state.connections.get(id))
            .filter(|client| client.sender.send(frame.clone()).is_ok())
            .count()
    }

    /// Send a frame to every live connection of `user_id`.
    pub fn deliver_to_user(&self, user_id: Uuid, frame: &ServerFrame) -> usize {
        let state = self.state.lock();

        let Some(sessions) = state.users.get(&user_id) else {
            return 0;
        };

        sessions
            .iter()
            .filter_map(|id| state.connections.get(id))
            .filter(|client| client.sender.send(frame.clone()).is_ok())
            .count()
    }

    /// Live registered connections
    pub fn connection_count(&self) -> usize {
        self.state.lock().connections.len()
    }

    /// Connections subscribed to `room`
    pub fn subscriber_count(&self, room: &str) -> usize {
        self.state
            .lock()
            .rooms
            .get(room)
            .map_or(0, HashSet::len)
    }

    /// Rooms with at least one subscriber
    pub fn room_count(&self) -> usize {
        self.state.lock().rooms.len()
    }
}

fn remove_subscriber(
    rooms: &mut HashMap<String, HashSet<ConnectionId>>,
    room: &str,
    connection_id: ConnectionId,
) {
    if let Some(subscribers) = rooms.get_mut(room) {
        subscribers.remove(&connection_id);
        if subscribers.is_empty() {
            rooms.remove(room);
        }
    }
}

impl RoomBroadcaster for ConnectionRegistry {
    fn broadcast_message(&self, message: &GroupMessage) -> usize {
        let room = group_room(message.group_id);
        let delivered = self.deliver(&room, &ServerFrame::new_message(message));
        metrics::record_fanout(delivered);
        delivered
    }
}

impl DirectBroadcaster for ConnectionRegistry {
    fn broadcast_direct(&self, message: &DirectMessage) -> usize {
        let frame = ServerFrame::new_direct_message(message);
        let delivered = message
            .participants()
            .map(|user_id| self.deliver_to_user(user_id, &frame))
            .sum();
        metrics::record_fanout(delivered);
        delivered
    }
}
