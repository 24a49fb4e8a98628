//! Direct Message Service
//!
//! One-to-one chat. There is no membership to check: any authenticated user
//! may write to any other registered user. A message is persisted first and
//! then delivered to every live connection of both participants.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::group_service::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use crate::domain::{DirectBroadcaster, DirectMessage, DirectMessageRepository};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Direct message service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectMessageService: Send + Sync {
    /// Persist and deliver a message from `sender_id`.
    async fn send_direct(
        &self,
        sender_id: Uuid,
        request: SendDirectDto,
    ) -> Result<DirectMessage, DirectError>;

    /// Recent messages between `user_id` and `peer_id`, newest first.
    async fn conversation(
        &self,
        user_id: Uuid,
        peer_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<DirectMessage>, DirectError>;
}

/// Send direct message request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendDirectDto {
    pub recipient_id: Uuid,
    pub content: String,
}

/// Direct message errors. `Display` is the reason sent back to the sender.
#[derive(Debug, thiserror::Error)]
pub enum DirectError {
    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("cannot send a message to yourself")]
    SelfMessage,

    #[error("recipient not found")]
    UnknownRecipient,

    #[error("failed to send message")]
    Persistence(String),

    #[error("message store timed out")]
    Timeout,
}

/// DirectMessageService implementation
pub struct DirectMessageServiceImpl<D, B>
where
    D: DirectMessageRepository,
    B: DirectBroadcaster + ?Sized,
{
    repo: Arc<D>,
    broadcaster: Arc<B>,
    store_timeout: Duration,
}

impl<D, B> DirectMessageServiceImpl<D, B>
where
    D: DirectMessageRepository,
    B: DirectBroadcaster + ?Sized,
{
    pub fn new(repo: Arc<D>, broadcaster: Arc<B>, store_timeout: Duration) -> Self {
        Self {
            repo,
            broadcaster,
            store_timeout,
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, DirectError>
    where
        F: Future<Output = Result<T, AppError>> + Send,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(AppError::NotFound(_))) => Err(DirectError::UnknownRecipient),
            Ok(Err(e)) => Err(DirectError::Persistence(e.to_string())),
            Err(_) => Err(DirectError::Timeout),
        }
    }
}

#[async_trait]
impl<D, B> DirectMessageService for DirectMessageServiceImpl<D, B>
where
    D: DirectMessageRepository + 'static,
    B: DirectBroadcaster + ?Sized + 'static,
{
    async fn send_direct(
        &self,
        sender_id: Uuid,
        request: SendDirectDto,
    ) -> Result<DirectMessage, DirectError> {
        if request.recipient_id == sender_id {
            metrics::record_direct_message("rejected");
            return Err(DirectError::SelfMessage);
        }
        if request.content.trim().is_empty() {
            metrics::record_direct_message("rejected");
            return Err(DirectError::EmptyMessage);
        }

        let message = DirectMessage::new(sender_id, request.recipient_id, request.content);

        let persisted = match self.bounded(self.repo.create(&message)).await {
            Ok(persisted) => persisted,
            Err(e) => {
                let outcome = match e {
                    DirectError::UnknownRecipient => "rejected",
                    _ => "failed",
                };
                metrics::record_direct_message(outcome);
                tracing::debug!(sender_id = %sender_id, recipient_id = %message.recipient_id, error = ?e, "Direct message not stored");
                return Err(e);
            }
        };

        let delivered = self.broadcaster.broadcast_direct(&persisted);
        metrics::record_direct_message("persisted");

        tracing::debug!(
            message_id = %persisted.id,
            sender_id = %sender_id,
            recipient_id = %persisted.recipient_id,
            delivered,
            "Direct message delivered"
        );

        Ok(persisted)
    }

    async fn conversation(
        &self,
        user_id: Uuid,
        peer_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<DirectMessage>, DirectError> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);

        self.bounded(self.repo.find_conversation(user_id, peer_id, limit))
            .await
    }
}
