//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {}", summary(.0))]
    Validation(Vec<FieldError>),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The first field error, shown as the top-level message.
fn summary(errors: &[FieldError]) -> String {
    errors
        .first()
        .map(|e| format!("{}: {}", e.field, e.message))
        .unwrap_or_else(|| "Validation failed".into())
}

impl AppError {
    /// HTTP status, stable numeric code and client-safe message.
    fn parts(&self) -> (StatusCode, u16, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 10003, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, 10004, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, 10005, msg.clone()),
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, 10007, summary(errors)),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let errors = match self {
            AppError::Validation(errors) if !errors.is_empty() => Some(errors),
            _ => None,
        };

        let body = ErrorResponse {
            code,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(AppError::NotFound("group not found".into()), StatusCode::NOT_FOUND, 10001 ; "not found")]
    #[test_case(AppError::Unauthorized("Invalid token".into()), StatusCode::UNAUTHORIZED, 10003 ; "unauthorized")]
    #[test_case(AppError::Forbidden("nope".into()), StatusCode::FORBIDDEN, 10004 ; "forbidden")]
    #[test_case(AppError::Conflict("group already exists".into()), StatusCode::CONFLICT, 10005 ; "conflict")]
    #[test_case(AppError::Validation(vec![FieldError::new("name", "too short")]), StatusCode::BAD_REQUEST, 10007 ; "validation")]
    fn maps_to_status_and_code(error: AppError, status: StatusCode, code: u16) {
        let (actual_status, actual_code, _) = error.parts();
        assert_eq!(actual_status, status);
        assert_eq!(actual_code, code);
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let (status, _, message) = AppError::Internal("pool exhausted".into()).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }

    #[tokio::test]
    async fn validation_body_lists_every_field() {
        let error = AppError::Validation(vec![
            FieldError::new("email", "Invalid email format"),
            FieldError::new("password", "Password must be at least 8 characters"),
        ]);

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["message"], "email: Invalid email format");
        assert_eq!(body["errors"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["errors"][1]["field"], "password");
    }

    #[test]
    fn other_errors_carry_no_field_list() {
        let body = serde_json::to_value(ErrorResponse {
            code: 10001,
            message: "group not found".into(),
            errors: None,
        })
        .unwrap();
        assert!(body.get("errors").is_none());
    }
}
