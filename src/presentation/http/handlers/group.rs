//! Group Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{CreateGroupRequest, MessagesQuery};
use crate::application::dto::response::{
    GroupCreatedResponse, GroupSummaryResponse, MessageResponse,
};
use crate::application::services::{CreateGroupDto, GroupError, GroupService, GroupServiceImpl};
use crate::infrastructure::repositories::{PgGroupRepository, PgMessageRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn group_service(state: &AppState) -> GroupServiceImpl<PgGroupRepository, PgMessageRepository> {
    GroupServiceImpl::new(
        Arc::new(PgGroupRepository::new(state.db.clone())),
        Arc::new(PgMessageRepository::new(state.db.clone())),
    )
}

impl From<GroupError> for AppError {
    fn from(error: GroupError) -> Self {
        match error {
            GroupError::AlreadyExists | GroupError::AlreadyMember => {
                AppError::Conflict(error.to_string())
            }
            GroupError::NotFound => AppError::NotFound(error.to_string()),
            GroupError::NotMember => AppError::BadRequest(error.to_string()),
            GroupError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Create a new group owned by the caller
pub async fn create_group(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupCreatedResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let request = CreateGroupDto {
        name: body.name,
        description: body.description,
    };

    let group = group_service(&state)
        .create_group(auth.user_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GroupCreatedResponse {
            group_id: group.id.to_string(),
        }),
    ))
}

/// Join a group by name
pub async fn join_group(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    group_service(&state).join_group(&name, auth.user_id).await?;
    Ok(StatusCode::OK)
}

/// Leave a group by name
pub async fn leave_group(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    group_service(&state).leave_group(&name, auth.user_id).await?;
    Ok(StatusCode::OK)
}

/// List the caller's groups
pub async fn list_groups(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<GroupSummaryResponse>>, AppError> {
    let groups = group_service(&state).groups_for_user(auth.user_id).await?;
    Ok(Json(groups.into_iter().map(GroupSummaryResponse::from).collect()))
}

/// Recent messages of a group; members only
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let messages = group_service(&state)
        .get_messages(group_id, auth.user_id, query.limit)
        .await
        .map_err(|e| match e {
            GroupError::NotMember => AppError::Forbidden(e.to_string()),
            e => AppError::from(e),
        })?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}
