//! Group message entity and repository trait.
//!
//! Maps to the `group_messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A chat message posted to a group. Immutable once persisted.
///
/// Maps to the `group_messages` table:
/// - id: UUID PRIMARY KEY (v7, server assigned)
/// - group_id: UUID NOT NULL REFERENCES groups(id)
/// - author_id: UUID NOT NULL REFERENCES users(id)
/// - content: TEXT NOT NULL
/// - media_url: TEXT NULL
/// - created_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMessage {
    pub id: Uuid,
    pub group_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GroupMessage {
    /// Build a new message with a server-assigned id and timestamp.
    pub fn new(
        group_id: Uuid,
        author_id: Uuid,
        content: impl Into<String>,
        media_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            group_id,
            author_id,
            content: content.into(),
            media_url,
            created_at: Utc::now(),
        }
    }

    /// A message must carry text, media, or both.
    pub fn has_body(&self) -> bool {
        !self.content.trim().is_empty()
            || self.media_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }
}

/// Repository trait for GroupMessage data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert a message.
    async fn create(&self, message: &GroupMessage) -> Result<GroupMessage, AppError>;

    /// Most recent messages of a group, newest first.
    async fn find_by_group(&self, group_id: Uuid, limit: i64)
        -> Result<Vec<GroupMessage>, AppError>;
}
