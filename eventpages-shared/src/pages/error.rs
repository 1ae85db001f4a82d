/// Page operation errors
///
/// `DuplicateSlug` and `Invalid` are user-correctable and carry the
/// offending fields; `NotFound` and `Forbidden` are terminal for the request.

use serde::{Deserialize, Serialize};

use super::store::StoreError;
use crate::auth::authorization::AuthzError;

/// Message shown when a slug is already taken in the event
pub const DUPLICATE_SLUG_MESSAGE: &str = "You already have a page on that URL.";

/// Validation error for a single form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,

    /// Human-readable message
    pub message: String,

    /// Machine-readable code (e.g. "duplicate_slug")
    pub code: String,
}

impl FieldError {
    pub fn new(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            code: code.to_string(),
        }
    }
}

/// Error type for page operations
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The actor may not manage pages of this event
    #[error("Not permitted to manage pages of this event")]
    Forbidden,

    /// Page, event or result page absent (or owned by another event)
    #[error("The requested page does not exist.")]
    NotFound,

    /// Another page of the event already uses the slug
    #[error("{}", DUPLICATE_SLUG_MESSAGE)]
    DuplicateSlug { slug: String },

    /// Field validation failed
    #[error("Invalid page data: {} field error(s)", .0.len())]
    Invalid(Vec<FieldError>),

    /// The authorization backend failed
    #[error("Authorization check failed: {0}")]
    Authorization(String),

    /// Persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PageError {
    /// Field errors to show inline on the form, if this error has any
    pub fn field_errors(&self) -> Option<Vec<FieldError>> {
        match self {
            PageError::DuplicateSlug { .. } => Some(vec![FieldError::new(
                "slug",
                "duplicate_slug",
                DUPLICATE_SLUG_MESSAGE,
            )]),
            PageError::Invalid(errors) => Some(errors.clone()),
            _ => None,
        }
    }
}

impl From<AuthzError> for PageError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden { .. } => PageError::Forbidden,
            AuthzError::DatabaseError(e) => PageError::Authorization(e.to_string()),
        }
    }
}
