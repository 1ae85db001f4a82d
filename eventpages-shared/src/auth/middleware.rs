/// Request authentication context
///
/// The API's bearer-token middleware validates the `Authorization` header
/// with [`authenticate_bearer`] and inserts the resulting [`AuthContext`]
/// into the request extensions, where handlers pick it up with
/// `Extension<AuthContext>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};

/// The authenticated principal of a control request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates a context for `user_id`
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for bearer authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not a Bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        };

        (status, self.to_string()).into_response()
    }
}

/// Validates an `Authorization` header value
///
/// # Errors
///
/// - `MissingCredentials` when the header is absent
/// - `InvalidFormat` when it is not `Bearer <token>`
/// - `InvalidToken` when the token fails validation
pub fn authenticate_bearer(header: Option<&str>, secret: &str) -> Result<AuthContext, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token.trim(), secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(AuthContext::new(claims.sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_authenticate_valid_bearer() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id), SECRET).unwrap();

        let context = authenticate_bearer(Some(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(context, AuthContext::new(user_id));
    }

    #[test]
    fn test_authenticate_missing_and_malformed() {
        assert!(matches!(
            authenticate_bearer(None, SECRET),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            authenticate_bearer(Some("Basic dXNlcjpwYXNz"), SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            authenticate_bearer(Some("Bearer nope"), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_auth_error_into_response() {
        assert_eq!(
            AuthError::MissingCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidFormat("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
