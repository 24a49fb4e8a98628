//! Message Repository Implementation
//!
//! PostgreSQL implementation of group message storage and history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{GroupMessage, MessageRepository};
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps to the group_messages table schema defined in the migration.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    group_id: Uuid,
    author_id: Uuid,
    content: String,
    media_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> GroupMessage {
        GroupMessage {
            id: self.id,
            group_id: self.group_id,
            author_id: self.author_id,
            content: self.content,
            media_url: self.media_url,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: &GroupMessage) -> Result<GroupMessage, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO group_messages (id, group_id, author_id, content, media_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, group_id, author_id, content, media_url, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.group_id)
        .bind(message.author_id)
        .bind(&message.content)
        .bind(&message.media_url)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    async fn find_by_group(
        &self,
        group_id: Uuid,
        limit: i64,
    ) -> Result<Vec<GroupMessage>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, group_id, author_id, content, media_url, created_at
            FROM group_messages
            WHERE group_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(group_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }
}
