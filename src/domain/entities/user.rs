//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a student account.
///
/// Maps to the `users` table:
/// - id: UUID PRIMARY KEY
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: TEXT NOT NULL (Argon2id PHC string)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,

    pub username: String,

    pub email: String,

    /// Never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh identifier.
    pub fn new(username: impl Into<String>, email: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            email: email.into(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Conflict reason reported by [`UserRepository::create`] for a taken username.
pub const USERNAME_TAKEN: &str = "username already taken";

/// Conflict reason reported by [`UserRepository::create`] for a registered email.
pub const EMAIL_TAKEN: &str = "email already registered";

/// Repository trait for User data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by email address (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user.
    ///
    /// A unique violation is `AppError::Conflict` carrying [`USERNAME_TAKEN`]
    /// or [`EMAIL_TAKEN`].
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Check whether an email is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check whether a username is taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
}
