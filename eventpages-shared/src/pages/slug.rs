/// Page slugs
///
/// A slug is the URL form of a page: 1 to 150 characters from
/// `[a-zA-Z0-9.-]`. It must be unique within its event and is only checked
/// when a page is created, since edits never change it.

use uuid::Uuid;

use super::error::PageError;
use super::store::{PageUnit, StoreError};
use crate::models::page::PAGE_SLUG_CONSTRAINT;

/// Maximum slug length in characters
pub const SLUG_MAX_LENGTH: usize = 150;

/// Syntax problems with a submitted slug
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("This field is required.")]
    Empty,

    #[error("Ensure this value has at most 150 characters.")]
    TooLong,

    #[error("The slug may only contain letters, numbers, dots and dashes.")]
    InvalidCharacter(char),
}

impl SlugError {
    /// Machine-readable code reported with the field error
    pub fn code(&self) -> &'static str {
        match self {
            SlugError::Empty => "required",
            SlugError::TooLong => "max_length",
            SlugError::InvalidCharacter(_) => "invalid_slug",
        }
    }
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}

/// Checks length and character set
pub fn validate_slug_format(slug: &str) -> Result<(), SlugError> {
    if slug.is_empty() {
        return Err(SlugError::Empty);
    }

    if slug.chars().count() > SLUG_MAX_LENGTH {
        return Err(SlugError::TooLong);
    }

    match slug.chars().find(|c| !is_slug_char(*c)) {
        Some(c) => Err(SlugError::InvalidCharacter(c)),
        None => Ok(()),
    }
}

/// Fails with `DuplicateSlug` if the event already has a page on `slug`
///
/// The comparison is exact. Runs inside the creating unit of work; a
/// concurrent insert that slips past this check is caught by
/// [`conflict_to_duplicate`] when the unique index rejects it.
pub async fn ensure_unique(unit: &mut dyn PageUnit, event_id: Uuid, slug: &str) -> Result<(), PageError> {
    if unit.slug_exists(event_id, slug).await? {
        return Err(PageError::DuplicateSlug {
            slug: slug.to_string(),
        });
    }

    Ok(())
}

/// Maps a rejected insert on the `(event_id, slug)` index to `DuplicateSlug`
pub fn conflict_to_duplicate(err: StoreError, slug: &str) -> PageError {
    match err {
        StoreError::UniqueViolation(constraint) if constraint == PAGE_SLUG_CONSTRAINT => PageError::DuplicateSlug {
            slug: slug.to_string(),
        },
        other => PageError::Store(other),
    }
}
