/// Page management endpoints
///
/// All endpoints require a bearer token and the `manage_pages` permission on
/// the event named in the path. Mutations answer with the affected value,
/// the notifications to show once, and the list URL to return to.
///
/// # Endpoints
///
/// - `GET  /control/event/:organizer/:event/pages/?page=N` - List pages
/// - `POST /control/event/:organizer/:event/pages/add` - Create page
/// - `GET  /control/event/:organizer/:event/pages/:page/edit` - Edit form
/// - `POST /control/event/:organizer/:event/pages/:page/edit` - Update page
/// - `GET  /control/event/:organizer/:event/pages/:page/delete` - Delete confirmation
/// - `POST /control/event/:organizer/:event/pages/:page/delete` - Delete page
/// - `GET  /control/event/:organizer/:event/pages/logs` - Audit trail

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use eventpages_shared::{
    auth::middleware::AuthContext,
    models::{audit_log::AuditEntry, event::EventRef, page::Page},
    notification::Notification,
    pages::{EditPageForm, Outcome, PageError, PageForm, Paginated},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 1-based batch number (default: 1)
    pub page: Option<String>,
}

impl ListQuery {
    /// Requested batch number
    ///
    /// A value that is not a number maps to 0, which no batch has, so it is
    /// answered like any other out-of-range batch.
    pub fn batch_number(&self) -> i64 {
        match self.page.as_deref() {
            None => 1,
            Some(raw) => raw.trim().parse().unwrap_or(0),
        }
    }
}

/// Response of a mutating request
#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse<T> {
    pub data: T,

    /// Messages to show once
    pub messages: Vec<Notification>,

    /// Where the client goes next
    pub redirect_to: String,
}

/// Edit form contents
#[derive(Debug, Serialize, Deserialize)]
pub struct EditFormResponse {
    pub page: Page,

    /// Initial form values (the slug is shown but not editable)
    pub form: EditPageForm,
}

/// Delete confirmation contents
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteConfirmationResponse {
    pub page: Page,
}

/// Audit trail response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuditTrailResponse {
    pub entries: Vec<AuditEntry>,
}

/// URL of an event's page list
pub fn list_url(event: &EventRef) -> String {
    format!("/control/event/{}/{}/pages/", event.organizer_slug, event.slug)
}

/// Parses the page ID of the path
///
/// An ID that is not a UUID names no page. It is reported as `NotFound`, but
/// only after the actor's permission on the event has been checked.
async fn authorized_page_id(
    state: &AppState,
    auth: &AuthContext,
    event: &EventRef,
    raw: &str,
) -> Result<Uuid, PageError> {
    match Uuid::parse_str(raw) {
        Ok(id) => Ok(id),
        Err(_) => {
            state.pages.authorize(auth, event).await?;
            Err(PageError::NotFound)
        }
    }
}

/// Unwraps a request body once the actor is allowed to submit it
async fn authorized_body<T>(
    state: &AppState,
    auth: &AuthContext,
    event: &EventRef,
    body: Result<Json<T>, JsonRejection>,
) -> ApiResult<T> {
    state.pages.authorize(auth, event).await?;
    let Json(form) = body?;

    Ok(form)
}

fn mutation<T>(event: &EventRef, outcome: Outcome<T>) -> Json<MutationResponse<T>> {
    Json(MutationResponse {
        data: outcome.value,
        messages: vec![outcome.notification],
        redirect_to: list_url(event),
    })
}

/// List pages
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: No permission on the event
/// - `404 Not Found`: Unknown event or batch number out of range
pub async fn list_pages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((organizer, event)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Paginated<Page>>> {
    let event = state.pages.resolve_event(&organizer, &event).await?;
    let pages = state.pages.list(&auth, &event, query.batch_number()).await?;

    Ok(Json(pages))
}

/// Create a page
///
/// # Request Body
///
/// ```json
/// {
///   "title": {"en": "Imprint", "de": "Impressum"},
///   "slug": "imprint",
///   "text": "Acme Inc.",
///   "link_in_footer": true,
///   "link_on_frontpage": false
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: No permission on the event, checked before the body is read
/// - `400 Bad Request`: Body is not JSON
/// - `422 Unprocessable Entity`: Invalid fields or slug already taken
pub async fn create_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((organizer, event)): Path<(String, String)>,
    body: Result<Json<PageForm>, JsonRejection>,
) -> ApiResult<Json<MutationResponse<Page>>> {
    let event = state.pages.resolve_event(&organizer, &event).await?;
    let form = authorized_body(&state, &auth, &event, body).await?;
    let outcome = state.pages.create(&auth, &event, form).await?;

    Ok(mutation(&event, outcome))
}

/// Show the edit form of a page
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((organizer, event, page_id)): Path<(String, String, String)>,
) -> ApiResult<Json<EditFormResponse>> {
    let event = state.pages.resolve_event(&organizer, &event).await?;
    let id = authorized_page_id(&state, &auth, &event, &page_id).await?;
    let page = state.pages.get(&auth, &event, id).await?;

    Ok(Json(EditFormResponse {
        form: EditPageForm::from(&page),
        page,
    }))
}

/// Update a page
///
/// A submitted `slug` is ignored.
pub async fn update_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((organizer, event, page_id)): Path<(String, String, String)>,
    body: Result<Json<EditPageForm>, JsonRejection>,
) -> ApiResult<Json<MutationResponse<Page>>> {
    let event = state.pages.resolve_event(&organizer, &event).await?;
    let form = authorized_body(&state, &auth, &event, body).await?;
    let id = authorized_page_id(&state, &auth, &event, &page_id).await?;
    let outcome = state.pages.update(&auth, &event, id, form).await?;

    Ok(mutation(&event, outcome))
}

/// Show the delete confirmation of a page
pub async fn delete_confirmation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((organizer, event, page_id)): Path<(String, String, String)>,
) -> ApiResult<Json<DeleteConfirmationResponse>> {
    let event = state.pages.resolve_event(&organizer, &event).await?;
    let id = authorized_page_id(&state, &auth, &event, &page_id).await?;
    let page = state.pages.get(&auth, &event, id).await?;

    Ok(Json(DeleteConfirmationResponse { page }))
}

/// Delete a page
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((organizer, event, page_id)): Path<(String, String, String)>,
) -> ApiResult<Json<MutationResponse<Uuid>>> {
    let event = state.pages.resolve_event(&organizer, &event).await?;
    let id = authorized_page_id(&state, &auth, &event, &page_id).await?;
    let outcome = state.pages.delete(&auth, &event, id).await?;

    Ok(mutation(&event, outcome))
}

/// List the event's page audit entries, newest first
pub async fn audit_trail(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((organizer, event)): Path<(String, String)>,
) -> ApiResult<Json<AuditTrailResponse>> {
    let event = state.pages.resolve_event(&organizer, &event).await?;
    let entries = state.pages.audit_trail(&auth, &event).await?;

    Ok(Json(AuditTrailResponse { entries }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> ListQuery {
        ListQuery {
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn test_batch_number() {
        assert_eq!(query(None).batch_number(), 1);
        assert_eq!(query(Some("3")).batch_number(), 3);
        assert_eq!(query(Some(" 2 ")).batch_number(), 2);
        assert_eq!(query(Some("abc")).batch_number(), 0);
        assert_eq!(query(Some("")).batch_number(), 0);
    }
}
