//! Message Service
//!
//! The group chat send path: `received -> authorized -> persisted | rejected`.
//!
//! 1. **authorize**: resolve the room to a durable group and require a
//!    membership row for the author. The author id always comes from the
//!    authenticated connection, never from the message payload.
//! 2. **persist**: insert the message with a server-assigned id and timestamp.
//! 3. **fan-out**: hand the persisted message to the [`RoomBroadcaster`],
//!    which delivers to the group's canonical room whichever way the sender
//!    spelled it.
//!
//! Nothing is retried. A failure at any step returns an error to the caller and
//! skips every later step, so an unpersisted message is never broadcast.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{GroupMessage, GroupRepository, MessageRepository, RoomBroadcaster};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Message service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Authorize, persist and broadcast a message from `author_id`.
    async fn send_message(
        &self,
        author_id: Uuid,
        request: SendMessageDto,
    ) -> Result<GroupMessage, MessageError>;

    /// Resolve a client room identifier to its group. `None` for an unknown name.
    async fn resolve_room(&self, room: &str) -> Result<Option<Uuid>, MessageError>;
}

/// Send message request, as parsed from a `send_message` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageDto {
    /// Room identifier: a group UUID or a group name
    pub room: String,
    pub content: String,
    pub media_url: Option<String>,
}

/// Message service errors. `Display` is the reason sent back to the sender.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("not allowed to post to this group")]
    NotAllowed,

    #[error("either content or media_url must be provided")]
    EmptyMessage,

    #[error("failed to send message")]
    Persistence(String),

    #[error("message store timed out")]
    Timeout,
}

/// MessageService implementation
pub struct MessageServiceImpl<G, M, B>
where
    G: GroupRepository,
    M: MessageRepository,
    B: RoomBroadcaster + ?Sized,
{
    group_repo: Arc<G>,
    message_repo: Arc<M>,
    broadcaster: Arc<B>,
    store_timeout: Duration,
}

impl<G, M, B> MessageServiceImpl<G, M, B>
where
    G: GroupRepository,
    M: MessageRepository,
    B: RoomBroadcaster + ?Sized,
{
    pub fn new(
        group_repo: Arc<G>,
        message_repo: Arc<M>,
        broadcaster: Arc<B>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            group_repo,
            message_repo,
            broadcaster,
            store_timeout,
        }
    }

    /// Run one store round trip under the configured timeout.
    async fn bounded<T, F>(&self, call: F) -> Result<T, MessageError>
    where
        F: Future<Output = Result<T, AppError>> + Send,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(MessageError::Persistence(e.to_string())),
            Err(_) => Err(MessageError::Timeout),
        }
    }

    /// A UUID names the group directly; anything else is a group name.
    async fn lookup_group(&self, room: &str) -> Result<Option<Uuid>, MessageError> {
        if let Ok(group_id) = Uuid::parse_str(room) {
            return Ok(Some(group_id));
        }
        self.bounded(self.group_repo.find_id_by_name(room)).await
    }

    async fn authorize(&self, author_id: Uuid, room: &str) -> Result<Uuid, MessageError> {
        let group_id = self
            .lookup_group(room)
            .await?
            .ok_or(MessageError::NotAllowed)?;

        if !self
            .bounded(self.group_repo.is_member(author_id, group_id))
            .await?
        {
            return Err(MessageError::NotAllowed);
        }

        Ok(group_id)
    }
}

#[async_trait]
impl<G, M, B> MessageService for MessageServiceImpl<G, M, B>
where
    G: GroupRepository + 'static,
    M: MessageRepository + 'static,
    B: RoomBroadcaster + ?Sized + 'static,
{
    async fn send_message(
        &self,
        author_id: Uuid,
        request: SendMessageDto,
    ) -> Result<GroupMessage, MessageError> {
        let group_id = match self.authorize(author_id, &request.room).await {
            Ok(group_id) => group_id,
            Err(e) => {
                metrics::record_group_message(outcome(&e));
                tracing::debug!(author_id = %author_id, room = %request.room, error = %e, "Message rejected");
                return Err(e);
            }
        };

        let message = GroupMessage::new(group_id, author_id, request.content, request.media_url);
        if !message.has_body() {
            metrics::record_group_message("rejected");
            return Err(MessageError::EmptyMessage);
        }

        let persisted = match self.bounded(self.message_repo.create(&message)).await {
            Ok(persisted) => persisted,
            Err(e) => {
                metrics::record_group_message("failed");
                tracing::warn!(
                    author_id = %author_id,
                    group_id = %group_id,
                    error = ?e,
                    "Failed to persist group message"
                );
                return Err(e);
            }
        };

        let delivered = self.broadcaster.broadcast_message(&persisted);
        metrics::record_group_message("persisted");

        tracing::debug!(
            message_id = %persisted.id,
            group_id = %group_id,
            room = %request.room,
            delivered,
            "Group message broadcast"
        );

        Ok(persisted)
    }

    async fn resolve_room(&self, room: &str) -> Result<Option<Uuid>, MessageError> {
        self.lookup_group(room).await
    }
}

fn outcome(error: &MessageError) -> &'static str {
    match error {
        MessageError::NotAllowed | MessageError::EmptyMessage => "rejected",
        MessageError::Persistence(_) | MessageError::Timeout => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{group_room, MockGroupRepository, MockMessageRepository};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    /// Records every broadcast instead of delivering it.
    #[derive(Default)]
    struct RecordingBroadcaster {
        sent: Mutex<Vec<(String, GroupMessage)>>,
    }

    impl RoomBroadcaster for RecordingBroadcaster {
        fn broadcast_message(&self, message: &GroupMessage) -> usize {
            self.sent
                .lock()
                .push((group_room(message.group_id), message.clone()));
            1
        }
    }

    fn service(
        groups: MockGroupRepository,
        messages: MockMessageRepository,
    ) -> (
        MessageServiceImpl<MockGroupRepository, MockMessageRepository, RecordingBroadcaster>,
        Arc<RecordingBroadcaster>,
    ) {
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let service = MessageServiceImpl::new(
            Arc::new(groups),
            Arc::new(messages),
            broadcaster.clone(),
            Duration::from_secs(5),
        );
        (service, broadcaster)
    }

    fn request(room: &str, content: &str) -> SendMessageDto {
        SendMessageDto {
            room: room.into(),
            content: content.into(),
            media_url: None,
        }
    }

    #[tokio::test]
    async fn non_member_is_rejected_without_side_effects() {
        let group_id = Uuid::new_v4();
        let mut groups = MockGroupRepository::new();
        groups
            .expect_find_id_by_name()
            .withf(|name| name == "study-group-7")
            .returning(move |_| Ok(Some(group_id)));
        groups.expect_is_member().returning(|_, _| Ok(false));
        let mut messages = MockMessageRepository::new();
        messages.expect_create().never();

        let (service, broadcaster) = service(groups, messages);
        let err = service
            .send_message(Uuid::new_v4(), request("study-group-7", "hi"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "not allowed to post to this group");
        assert!(broadcaster.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn unknown_group_name_is_not_allowed() {
        let mut groups = MockGroupRepository::new();
        groups.expect_find_id_by_name().returning(|_| Ok(None));
        groups.expect_is_member().never();

        let (service, broadcaster) = service(groups, MockMessageRepository::new());
        let result = service
            .send_message(Uuid::new_v4(), request("ghost-room", "hi"))
            .await;

        assert!(matches!(result, Err(MessageError::NotAllowed)));
        assert!(broadcaster.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn member_message_is_persisted_then_broadcast_to_room() {
        let author = Uuid::new_v4();
        let group_id = Uuid::new_v4();
        let room = group_id.to_string();

        let mut groups = MockGroupRepository::new();
        groups.expect_find_id_by_name().never();
        groups
            .expect_is_member()
            .withf(move |user, group| *user == author && *group == group_id)
            .returning(|_, _| Ok(true));
        let mut messages = MockMessageRepository::new();
        messages
            .expect_create()
            .times(1)
            .returning(|message| Ok(message.clone()));

        let (service, broadcaster) = service(groups, messages);
        let message = service
            .send_message(author, request(&room, "hello group"))
            .await
            .unwrap();

        assert_eq!(message.author_id, author);
        assert_eq!(message.group_id, group_id);
        let sent = broadcaster.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, room);
        assert_eq!(sent[0].1, message);
    }

    #[tokio::test]
    async fn message_posted_by_name_is_broadcast_to_the_group_room() {
        let group_id = Uuid::new_v4();
        let mut groups = MockGroupRepository::new();
        groups
            .expect_find_id_by_name()
            .withf(|name| name == "Algo101")
            .returning(move |_| Ok(Some(group_id)));
        groups.expect_is_member().returning(|_, _| Ok(true));
        let mut messages = MockMessageRepository::new();
        messages.expect_create().returning(|message| Ok(message.clone()));

        let (service, broadcaster) = service(groups, messages);
        service
            .send_message(Uuid::new_v4(), request("Algo101", "by name"))
            .await
            .unwrap();

        let sent = broadcaster.sent.lock();
        assert_eq!(sent[0].0, group_id.to_string());
    }

    #[tokio::test]
    async fn resolve_room_maps_names_and_passes_ids_through() {
        let group_id = Uuid::new_v4();
        let mut groups = MockGroupRepository::new();
        groups
            .expect_find_id_by_name()
            .returning(move |name| Ok((name == "Algo101").then_some(group_id)));

        let (service, _) = service(groups, MockMessageRepository::new());

        assert_eq!(service.resolve_room("Algo101").await.unwrap(), Some(group_id));
        assert_eq!(service.resolve_room("nobody").await.unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(service.resolve_room(&id.to_string()).await.unwrap(), Some(id));
    }

    #[tokio::test]
    async fn persistence_failure_skips_fan_out() {
        let mut groups = MockGroupRepository::new();
        groups.expect_is_member().returning(|_, _| Ok(true));
        let mut messages = MockMessageRepository::new();
        messages
            .expect_create()
            .returning(|_| Err(AppError::Internal("disk full".into())));

        let (service, broadcaster) = service(groups, messages);
        let err = service
            .send_message(Uuid::new_v4(), request(&Uuid::new_v4().to_string(), "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, MessageError::Persistence(_)));
        assert_eq!(err.to_string(), "failed to send message");
        assert!(broadcaster.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_rejected_before_insert() {
        let mut groups = MockGroupRepository::new();
        groups.expect_is_member().returning(|_, _| Ok(true));
        let mut messages = MockMessageRepository::new();
        messages.expect_create().never();

        let (service, _) = service(groups, messages);
        let result = service
            .send_message(Uuid::new_v4(), request(&Uuid::new_v4().to_string(), "  "))
            .await;

        assert!(matches!(result, Err(MessageError::EmptyMessage)));
    }

    #[tokio::test]
    async fn membership_lookup_failure_is_reported() {
        let mut groups = MockGroupRepository::new();
        groups
            .expect_is_member()
            .returning(|_, _| Err(AppError::Internal("connection reset".into())));
        let mut messages = MockMessageRepository::new();
        messages.expect_create().never();

        let (service, broadcaster) = service(groups, messages);
        let result = service
            .send_message(Uuid::new_v4(), request(&Uuid::new_v4().to_string(), "hi"))
            .await;

        assert!(matches!(result, Err(MessageError::Persistence(_))));
        assert!(broadcaster.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn slow_store_call_times_out() {
        let service = MessageServiceImpl::new(
            Arc::new(MockGroupRepository::new()),
            Arc::new(MockMessageRepository::new()),
            Arc::new(RecordingBroadcaster::default()),
            Duration::from_millis(10),
        );

        let result = service
            .bounded(std::future::pending::<Result<(), AppError>>())
            .await;

        assert!(matches!(result, Err(MessageError::Timeout)));
    }
}
