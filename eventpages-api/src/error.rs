/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`, which converts to the matching
/// status code and a JSON error body.
///
/// # Example
///
/// ```
/// use eventpages_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::NotFound("The requested page does not exist.".to_string()))
/// }
/// ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eventpages_shared::auth::middleware::AuthError;
use eventpages_shared::pages::{FieldError, PageError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422) - validation errors and duplicate slugs
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,

    /// Machine-readable code (e.g. "duplicate_slug")
    pub code: String,
}

impl From<FieldError> for ValidationErrorDetail {
    fn from(err: FieldError) -> Self {
        Self {
            field: err.field,
            message: err.message,
            code: err.code,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert page errors to API errors
impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        if let Some(fields) = err.field_errors() {
            return ApiError::ValidationError(fields.into_iter().map(Into::into).collect());
        }

        match err {
            PageError::Forbidden => {
                ApiError::Forbidden("You do not have permission to manage pages of this event".to_string())
            }
            PageError::NotFound => ApiError::NotFound(err.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

/// Convert request body rejections to API errors
///
/// A well-formed body with a mistyped field is a validation error. Anything
/// else (syntax, content type, size) is a bad request.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "body".to_string(),
                message: err.body_text(),
                code: "invalid".to_string(),
            }]),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::Unauthorized("Missing credentials".to_string()),
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventpages_shared::pages::StoreError;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Page not found".to_string());
        assert_eq!(err.to_string(), "Not found: Page not found");
    }

    #[test]
    fn test_duplicate_slug_is_validation_error() {
        let err: ApiError = PageError::DuplicateSlug {
            slug: "imprint".to_string(),
        }
        .into();

        let ApiError::ValidationError(details) = err else {
            panic!("expected validation error");
        };
        assert_eq!(details[0].field, "slug");
        assert_eq!(details[0].code, "duplicate_slug");
        assert_eq!(details[0].message, "You already have a page on that URL.");
    }

    #[test]
    fn test_page_error_status_codes() {
        let cases = [
            (PageError::NotFound, StatusCode::NOT_FOUND),
            (PageError::Forbidden, StatusCode::FORBIDDEN),
            (PageError::Invalid(vec![]), StatusCode::UNPROCESSABLE_ENTITY),
            (
                PageError::Store(StoreError::Unavailable("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_every_error_uses_the_json_envelope() {
        let errors = [
            ApiError::BadRequest("bad".to_string()),
            ApiError::Unauthorized("who".to_string()),
            ApiError::Forbidden("no".to_string()),
            ApiError::NotFound("gone".to_string()),
            ApiError::ValidationError(vec![]),
            ApiError::InternalError("boom".to_string()),
        ];

        for err in errors {
            let response = err.into_response();
            assert!(response.status().is_client_error() || response.status().is_server_error());
            assert_eq!(
                response.headers().get("content-type").unwrap(),
                "application/json"
            );
        }
    }
}
