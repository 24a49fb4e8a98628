//! Direct message entity and repository trait.
//!
//! Maps to the `direct_messages` table. A conversation is the unordered
//! pair of its two participants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A one-to-one message. Immutable once persisted.
///
/// Maps to the `direct_messages` table:
/// - id: UUID PRIMARY KEY (v7, server assigned)
/// - sender_id: UUID NOT NULL REFERENCES users(id)
/// - recipient_id: UUID NOT NULL REFERENCES users(id)
/// - content: TEXT NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl DirectMessage {
    pub fn new(sender_id: Uuid, recipient_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender_id,
            recipient_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Both participants, each listed once.
    pub fn participants(&self) -> impl Iterator<Item = Uuid> {
        let recipient = (self.recipient_id != self.sender_id).then_some(self.recipient_id);
        std::iter::once(self.sender_id).chain(recipient)
    }
}

/// Repository trait for DirectMessage data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectMessageRepository: Send + Sync {
    /// Insert a message. An unknown recipient is `AppError::NotFound`.
    async fn create(&self, message: &DirectMessage) -> Result<DirectMessage, AppError>;

    /// Most recent messages exchanged between `user_a` and `user_b` in either
    /// direction, newest first.
    async fn find_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
    ) -> Result<Vec<DirectMessage>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participants_lists_sender_then_recipient() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let message = DirectMessage::new(a, b, "hey");

        assert_eq!(message.participants().collect::<Vec<_>>(), vec![a, b]);
    }
}
