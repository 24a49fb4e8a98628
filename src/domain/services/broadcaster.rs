//! Fan-out contracts.

use uuid::Uuid;

use crate::domain::{DirectMessage, GroupMessage};

/// Registry key of a group's room.
///
/// Clients may address a group by id or by name; subscriptions and
/// deliveries both use this key so the two spellings meet in one room.
pub fn group_room(group_id: Uuid) -> String {
    group_id.to_string()
}

/// Delivers a persisted group message to every live subscriber of its group's room.
///
/// Implementations are best-effort and at-most-once: a subscriber that cannot
/// take the message is skipped. Must not block, since callers invoke it right
/// after the persist step completes.
pub trait RoomBroadcaster: Send + Sync {
    /// Fan `message` out to [`group_room`] of its group and return how many
    /// subscribers it was handed to.
    fn broadcast_message(&self, message: &GroupMessage) -> usize;
}

/// Delivers a persisted direct message to every live connection of both participants.
///
/// Same delivery guarantees as [`RoomBroadcaster`].
pub trait DirectBroadcaster: Send + Sync {
    fn broadcast_direct(&self, message: &DirectMessage) -> usize;
}
