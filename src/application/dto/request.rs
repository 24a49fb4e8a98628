//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Create group request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "not_a_uuid")
    )]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Socket clients address a group by id or by name, and an id always wins,
/// so a UUID-shaped name could never be posted to.
fn not_a_uuid(name: &str) -> Result<(), ValidationError> {
    if Uuid::parse_str(name.trim()).is_ok() {
        return Err(ValidationError::new("uuid_name").with_message("Name must not be a UUID".into()));
    }
    Ok(())
}

/// Direct message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendDirectRequest {
    pub recipient_id: Uuid,

    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,
}

/// Message history query parameters
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<i64>,
}
