//! Group entity and repository trait.
//!
//! Maps to the `groups` table in the database schema. Durable membership
//! lives in [`super::member`]; both are served by the same repository since
//! group creation writes the group and its owner row in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::GroupRole;
use crate::shared::error::AppError;

/// A named study group with its own chat room.
///
/// Maps to the `groups` table:
/// - id: UUID PRIMARY KEY
/// - name: VARCHAR(100) NOT NULL UNIQUE
/// - description: TEXT NULL
/// - owner_id: UUID NOT NULL REFERENCES users(id)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group owned by `owner_id`.
    pub fn new(name: impl Into<String>, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            owner_id,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Group listing row with its current member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub member_count: i64,
}

/// Repository trait for groups and their durable membership.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Resolve a group name to its identifier.
    async fn find_id_by_name(&self, name: &str) -> Result<Option<Uuid>, AppError>;

    /// Insert the group and the owner's membership row atomically.
    ///
    /// Returns `AppError::Conflict` if the name is already taken.
    async fn create_with_owner(&self, group: &Group) -> Result<Group, AppError>;

    /// Insert a membership row. Returns `false` if the user was already a member.
    async fn add_member(&self, group_id: Uuid, user_id: Uuid, role: GroupRole)
        -> Result<bool, AppError>;

    /// Delete a membership row. Returns `false` if there was nothing to delete.
    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Check whether `user_id` holds a membership row for `group_id`.
    async fn is_member(&self, user_id: Uuid, group_id: Uuid) -> Result<bool, AppError>;

    /// All groups the user belongs to, most recently joined first.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<GroupSummary>, AppError>;
}
