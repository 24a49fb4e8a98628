//! Auth Gate
//!
//! Turns the handshake payload of a new connection into a user identity.
//! A rejection is terminal for the connection attempt.

use serde_json::Value;
use uuid::Uuid;

use crate::application::services::{AuthError, TokenService};

/// Handshake rejection reasons. `Display` is the text of the `connect_error` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandshakeError {
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Token required")]
    TokenRequired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid user ID")]
    InvalidUserId,
}

impl From<AuthError> for HandshakeError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidSubject => HandshakeError::InvalidUserId,
            _ => HandshakeError::InvalidToken,
        }
    }
}

/// Check the handshake map and resolve its `token` to a user id.
pub fn authenticate(payload: &Value, tokens: &TokenService) -> Result<Uuid, HandshakeError> {
    let Value::Object(fields) = payload else {
        return Err(HandshakeError::AuthenticationFailed);
    };

    let token = match fields.get("token") {
        Some(Value::String(token)) if !token.is_empty() => token,
        _ => return Err(HandshakeError::TokenRequired),
    };

    Ok(tokens.verify(token)?)
}

/// Parse a raw handshake frame; anything that is not JSON is not a map either.
pub fn authenticate_text(text: &str, tokens: &TokenService) -> Result<Uuid, HandshakeError> {
    let payload = serde_json::from_str::<Value>(text)
        .map_err(|_| HandshakeError::AuthenticationFailed)?;
    authenticate(&payload, tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::auth_service::tests::{signed, token_service};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn valid_token_resolves_to_its_user() {
        let tokens = token_service();
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id).unwrap().access_token;

        assert_eq!(authenticate(&json!({ "token": token }), &tokens), Ok(user_id));
    }

    #[test_case(json!({}) ; "empty map")]
    #[test_case(json!({ "token": "" }) ; "empty token")]
    #[test_case(json!({ "token": 42 }) ; "non-string token")]
    #[test_case(json!({ "token": null }) ; "null token")]
    fn missing_token_is_token_required(payload: Value) {
        assert_eq!(
            authenticate(&payload, &token_service()),
            Err(HandshakeError::TokenRequired)
        );
    }

    #[test_case(json!("token") ; "string")]
    #[test_case(json!(["token"]) ; "array")]
    #[test_case(Value::Null ; "null")]
    fn non_map_payload_fails_authentication(payload: Value) {
        assert_eq!(
            authenticate(&payload, &token_service()),
            Err(HandshakeError::AuthenticationFailed)
        );
    }

    #[test]
    fn garbage_and_expired_tokens_are_invalid() {
        let tokens = token_service();
        let expired = signed(&Uuid::new_v4().to_string(), -3600);

        assert_eq!(
            authenticate(&json!({ "token": "not-a-jwt" }), &tokens),
            Err(HandshakeError::InvalidToken)
        );
        assert_eq!(
            authenticate(&json!({ "token": expired }), &tokens),
            Err(HandshakeError::InvalidToken)
        );
    }

    #[test]
    fn non_uuid_subject_is_invalid_user_id() {
        let token = signed("12345", 3600);
        assert_eq!(
            authenticate(&json!({ "token": token }), &token_service()),
            Err(HandshakeError::InvalidUserId)
        );
    }

    #[test]
    fn unparseable_frame_fails_authentication() {
        assert_eq!(
            authenticate_text("hello", &token_service()),
            Err(HandshakeError::AuthenticationFailed)
        );
    }
}
