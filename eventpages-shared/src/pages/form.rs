/// Page forms
///
/// Creating and editing are separate contracts. [`PageForm`] carries a slug
/// that is validated and checked for uniqueness; [`EditPageForm`] accepts a
/// slug for symmetry with the create form but never uses it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use super::error::{FieldError, PageError};
use super::slug::validate_slug_format;
use crate::i18n::I18nString;
use crate::models::page::{NewPage, Page};

/// Maximum title length in characters, per translation
pub const TITLE_MAX_LENGTH: usize = 200;

/// Fields submitted when creating a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PageForm {
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub title: I18nString,

    #[serde(default)]
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,

    #[serde(default)]
    pub text: I18nString,

    #[serde(default)]
    pub link_in_footer: bool,

    #[serde(default)]
    pub link_on_frontpage: bool,
}

/// Fields submitted when editing a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EditPageForm {
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub title: I18nString,

    /// Ignored; the stored slug is kept
    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub text: I18nString,

    #[serde(default)]
    pub link_in_footer: bool,

    #[serde(default)]
    pub link_on_frontpage: bool,
}

fn validation_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}

fn validate_title(title: &I18nString) -> Result<(), ValidationError> {
    if title.is_blank() {
        return Err(validation_error("required", "This field is required.".to_string()));
    }

    if title.max_chars() > TITLE_MAX_LENGTH {
        return Err(validation_error(
            "max_length",
            format!("Ensure this value has at most {TITLE_MAX_LENGTH} characters."),
        ));
    }

    Ok(())
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    validate_slug_format(slug).map_err(|e| validation_error(e.code(), e.to_string()))
}

/// Flattens validator output into field errors, sorted by field
fn to_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
                code: error.code.to_string(),
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl PageForm {
    /// Validates every field
    pub fn clean(&self) -> Result<(), PageError> {
        self.validate()
            .map_err(|e| PageError::Invalid(to_field_errors(&e)))
    }

    /// Payload of the `page.added` audit entry: every submitted value
    pub fn audit_data(&self) -> JsonValue {
        serde_json::json!({
            "title": self.title,
            "slug": self.slug,
            "text": self.text,
            "link_in_footer": self.link_in_footer,
            "link_on_frontpage": self.link_on_frontpage,
        })
    }

    pub fn into_new_page(self, event_id: Uuid) -> NewPage {
        NewPage {
            event_id,
            title: self.title,
            slug: self.slug,
            text: self.text,
            link_in_footer: self.link_in_footer,
            link_on_frontpage: self.link_on_frontpage,
        }
    }
}

impl EditPageForm {
    /// Validates every field
    pub fn clean(&self) -> Result<(), PageError> {
        self.validate()
            .map_err(|e| PageError::Invalid(to_field_errors(&e)))
    }

    /// Fields whose submitted value differs from `page`, with the new value
    ///
    /// The slug is never part of the change set.
    pub fn changes(&self, page: &Page) -> Map<String, JsonValue> {
        let mut changed = Map::new();

        if self.title != page.title {
            changed.insert("title".to_string(), serde_json::json!(self.title));
        }
        if self.text != page.text {
            changed.insert("text".to_string(), serde_json::json!(self.text));
        }
        if self.link_in_footer != page.link_in_footer {
            changed.insert("link_in_footer".to_string(), JsonValue::Bool(self.link_in_footer));
        }
        if self.link_on_frontpage != page.link_on_frontpage {
            changed.insert(
                "link_on_frontpage".to_string(),
                JsonValue::Bool(self.link_on_frontpage),
            );
        }

        changed
    }

    /// Writes the editable fields onto `page`, leaving its slug untouched
    pub fn apply_to(self, page: &mut Page) {
        page.title = self.title;
        page.text = self.text;
        page.link_in_footer = self.link_in_footer;
        page.link_on_frontpage = self.link_on_frontpage;
    }
}

impl From<&Page> for EditPageForm {
    fn from(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            slug: Some(page.slug.clone()),
            text: page.text.clone(),
            link_in_footer: page.link_in_footer,
            link_on_frontpage: page.link_on_frontpage,
        }
    }
}
