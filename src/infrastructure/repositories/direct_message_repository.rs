//! Direct Message Repository Implementation
//!
//! PostgreSQL storage for one-to-one messages. Conversations are looked up
//! by the ordered participant pair so both directions share one index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DirectMessage, DirectMessageRepository};
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct PgDirectMessageRepository {
    pool: PgPool,
}

impl PgDirectMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DirectMessageRow {
    id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl DirectMessageRow {
    fn into_message(self) -> DirectMessage {
        DirectMessage {
            id: self.id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl DirectMessageRepository for PgDirectMessageRepository {
    async fn create(&self, message: &DirectMessage) -> Result<DirectMessage, AppError> {
        let row = sqlx::query_as::<_, DirectMessageRow>(
            r#"
            INSERT INTO direct_messages (id, sender_id, recipient_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, sender_id, recipient_id, content, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.content)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("recipient not found".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_message())
    }

    async fn find_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
    ) -> Result<Vec<DirectMessage>, AppError> {
        let rows = sqlx::query_as::<_, DirectMessageRow>(
            r#"
            SELECT id, sender_id, recipient_id, content, created_at
            FROM direct_messages
            WHERE LEAST(sender_id, recipient_id) = LEAST($1::uuid, $2::uuid)
              AND GREATEST(sender_id, recipient_id) = GREATEST($1::uuid, $2::uuid)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }
}
