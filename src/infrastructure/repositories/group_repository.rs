//! Group Repository Implementation
//!
//! PostgreSQL implementation of the GroupRepository trait, covering the
//! `groups` and `group_members` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Group, GroupRepository, GroupRole, GroupSummary};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self) -> Group {
        Group {
            id: self.id,
            name: self.name,
            description: self.description,
            owner_id: self.owner_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GroupSummaryRow {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    member_count: i64,
}

impl GroupSummaryRow {
    fn into_summary(self) -> GroupSummary {
        GroupSummary {
            id: self.id,
            name: self.name,
            owner_id: self.owner_id,
            created_at: self.created_at,
            member_count: self.member_count,
        }
    }
}

/// PostgreSQL group repository implementation.
#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    /// Create a new PgGroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn find_id_by_name(&self, name: &str) -> Result<Option<Uuid>, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    async fn create_with_owner(&self, group: &Group) -> Result<Group, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO groups (id, name, description, owner_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, owner_id, created_at
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.owner_id)
        .bind(group.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("group already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        // The owner is the first member
        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(group.id)
        .bind(group.owner_id)
        .bind(GroupRole::Owner.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into_group())
    }

    async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_member(&self, user_id: Uuid, group_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_members WHERE group_id = $1 AND user_id = $2)",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<GroupSummary>, AppError> {
        let rows = sqlx::query_as::<_, GroupSummaryRow>(
            r#"
            SELECT g.id, g.name, g.owner_id, g.created_at,
                   (SELECT COUNT(*) FROM group_members c WHERE c.group_id = g.id) AS member_count
            FROM groups g
            INNER JOIN group_members m ON m.group_id = g.id
            WHERE m.user_id = $1
            ORDER BY m.joined_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_summary()).collect())
    }
}
