//! Direct Chat Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{MessagesQuery, SendDirectRequest};
use crate::application::dto::response::DirectMessageResponse;
use crate::application::services::{
    DirectError, DirectMessageService, DirectMessageServiceImpl, SendDirectDto,
};
use crate::infrastructure::repositories::PgDirectMessageRepository;
use crate::presentation::middleware::AuthUser;
use crate::presentation::websocket::ConnectionRegistry;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn direct_service(
    state: &AppState,
) -> DirectMessageServiceImpl<PgDirectMessageRepository, ConnectionRegistry> {
    DirectMessageServiceImpl::new(
        Arc::new(PgDirectMessageRepository::new(state.db.clone())),
        state.registry.clone(),
        state.settings.database.query_timeout(),
    )
}

impl From<DirectError> for AppError {
    fn from(error: DirectError) -> Self {
        match error {
            DirectError::EmptyMessage | DirectError::SelfMessage => {
                AppError::BadRequest(error.to_string())
            }
            DirectError::UnknownRecipient => AppError::NotFound(error.to_string()),
            DirectError::Persistence(msg) => AppError::Internal(msg),
            DirectError::Timeout => AppError::Internal(error.to_string()),
        }
    }
}

/// Send a direct message; live connections of both users receive it too
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SendDirectRequest>,
) -> Result<(StatusCode, Json<DirectMessageResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let request = SendDirectDto {
        recipient_id: body.recipient_id,
        content: body.content,
    };

    let message = direct_service(&state)
        .send_direct(auth.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

/// Conversation between the caller and `user_id`, newest first
pub async fn get_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<DirectMessageResponse>>, AppError> {
    let messages = direct_service(&state)
        .conversation(auth.user_id, user_id, query.limit)
        .await?;

    Ok(Json(messages.into_iter().map(DirectMessageResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use test_case::test_case;

    #[test_case(DirectError::EmptyMessage, StatusCode::BAD_REQUEST ; "empty")]
    #[test_case(DirectError::SelfMessage, StatusCode::BAD_REQUEST ; "to self")]
    #[test_case(DirectError::UnknownRecipient, StatusCode::NOT_FOUND ; "unknown recipient")]
    #[test_case(DirectError::Timeout, StatusCode::INTERNAL_SERVER_ERROR ; "store timeout")]
    #[test_case(DirectError::Persistence("boom".into()), StatusCode::INTERNAL_SERVER_ERROR ; "store failure")]
    fn direct_errors_map_to_status(error: DirectError, status: StatusCode) {
        assert_eq!(AppError::from(error).into_response().status(), status);
    }
}
