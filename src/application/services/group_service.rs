//! Group Service
//!
//! Group lifecycle: creation, joining, leaving, listing and history. The
//! membership rows written here are what the message use case consults
//! before accepting a post.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Group, GroupMessage, GroupRepository, GroupRole, GroupSummary, MessageRepository,
};
use crate::shared::error::AppError;

/// Default page size for message history
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Upper bound for message history page size
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Group service trait
#[async_trait]
pub trait GroupService: Send + Sync {
    /// Create a group owned by `owner_id`
    async fn create_group(&self, owner_id: Uuid, request: CreateGroupDto) -> Result<Group, GroupError>;

    /// Join a group by name
    async fn join_group(&self, name: &str, user_id: Uuid) -> Result<(), GroupError>;

    /// Leave a group by name
    async fn leave_group(&self, name: &str, user_id: Uuid) -> Result<(), GroupError>;

    /// Groups the user belongs to
    async fn groups_for_user(&self, user_id: Uuid) -> Result<Vec<GroupSummary>, GroupError>;

    /// Recent messages of a group, newest first; members only
    async fn get_messages(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<GroupMessage>, GroupError>;
}

/// Create group request
#[derive(Debug, Clone)]
pub struct CreateGroupDto {
    pub name: String,
    pub description: Option<String>,
}

/// Group service errors
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("group already exists")]
    AlreadyExists,

    #[error("group not found")]
    NotFound,

    #[error("user is already a member")]
    AlreadyMember,

    #[error("user is not a member of the group")]
    NotMember,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for GroupError {
    fn from(error: AppError) -> Self {
        GroupError::Internal(error.to_string())
    }
}

/// GroupService implementation
pub struct GroupServiceImpl<G, M>
where
    G: GroupRepository,
    M: MessageRepository,
{
    group_repo: Arc<G>,
    message_repo: Arc<M>,
}

impl<G, M> GroupServiceImpl<G, M>
where
    G: GroupRepository,
    M: MessageRepository,
{
    pub fn new(group_repo: Arc<G>, message_repo: Arc<M>) -> Self {
        Self {
            group_repo,
            message_repo,
        }
    }

    async fn resolve(&self, name: &str) -> Result<Uuid, GroupError> {
        self.group_repo
            .find_id_by_name(name)
            .await?
            .ok_or(GroupError::NotFound)
    }
}

#[async_trait]
impl<G, M> GroupService for GroupServiceImpl<G, M>
where
    G: GroupRepository + 'static,
    M: MessageRepository + 'static,
{
    async fn create_group(&self, owner_id: Uuid, request: CreateGroupDto) -> Result<Group, GroupError> {
        if self.group_repo.find_id_by_name(&request.name).await?.is_some() {
            return Err(GroupError::AlreadyExists);
        }

        let group = Group::new(request.name, owner_id).with_description(request.description);

        // The unique index still guards against a concurrent create with the same name.
        let created = self
            .group_repo
            .create_with_owner(&group)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => GroupError::AlreadyExists,
                e => GroupError::Internal(e.to_string()),
            })?;

        tracing::info!(group_id = %created.id, owner_id = %owner_id, name = %created.name, "Group created");

        Ok(created)
    }

    async fn join_group(&self, name: &str, user_id: Uuid) -> Result<(), GroupError> {
        let group_id = self.resolve(name).await?;

        if !self
            .group_repo
            .add_member(group_id, user_id, GroupRole::Member)
            .await?
        {
            return Err(GroupError::AlreadyMember);
        }

        tracing::debug!(group_id = %group_id, user_id = %user_id, "User joined group");
        Ok(())
    }

    async fn leave_group(&self, name: &str, user_id: Uuid) -> Result<(), GroupError> {
        let group_id = self.resolve(name).await?;

        if !self.group_repo.remove_member(group_id, user_id).await? {
            return Err(GroupError::NotMember);
        }

        tracing::debug!(group_id = %group_id, user_id = %user_id, "User left group");
        Ok(())
    }

    async fn groups_for_user(&self, user_id: Uuid) -> Result<Vec<GroupSummary>, GroupError> {
        Ok(self.group_repo.find_by_user(user_id).await?)
    }

    async fn get_messages(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<GroupMessage>, GroupError> {
        if !self.group_repo.is_member(user_id, group_id).await? {
            return Err(GroupError::NotMember);
        }

        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);

        Ok(self.message_repo.find_by_group(group_id, limit).await?)
    }
}
