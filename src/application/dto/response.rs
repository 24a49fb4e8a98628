//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::application::services::AuthTokens;
use crate::domain::{DirectMessage, GroupMessage, GroupSummary, User};

/// Access token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Registration response (includes user and token)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub token: TokenResponse,
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Group creation response
#[derive(Debug, Serialize)]
pub struct GroupCreatedResponse {
    pub group_id: String,
}

/// Group listing entry
#[derive(Debug, Serialize)]
pub struct GroupSummaryResponse {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub member_count: i64,
    pub created_at: String,
}

impl From<GroupSummary> for GroupSummaryResponse {
    fn from(summary: GroupSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name,
            owner_id: summary.owner_id.to_string(),
            member_count: summary.member_count,
            created_at: summary.created_at.to_rfc3339(),
        }
    }
}

/// Message history entry
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub group_id: String,
    pub author_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    pub created_at: String,
}

impl From<GroupMessage> for MessageResponse {
    fn from(message: GroupMessage) -> Self {
        Self {
            id: message.id.to_string(),
            group_id: message.group_id.to_string(),
            author_id: message.author_id.to_string(),
            content: message.content,
            media_url: message.media_url,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Direct message entry
#[derive(Debug, Serialize)]
pub struct DirectMessageResponse {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<DirectMessage> for DirectMessageResponse {
    fn from(message: DirectMessage) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender_id.to_string(),
            recipient_id: message.recipient_id.to_string(),
            content: message.content,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}
