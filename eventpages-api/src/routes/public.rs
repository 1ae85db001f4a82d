/// Public page endpoints
///
/// No authentication. The response language is `?lang=` if given, otherwise
/// the preferred `Accept-Language` entry, otherwise the configured default.
///
/// # Endpoints
///
/// - `GET /:organizer/:event/page/:slug` - Rendered page
/// - `GET /:organizer/:event/page-links?placement=footer|frontpage` - Page links

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    Json,
};
use eventpages_shared::{
    i18n::negotiate_language,
    models::page::LinkPlacement,
    pages::render::{PageLink, PublicPage},
};
use serde::{Deserialize, Serialize};

/// Query parameters of the rendered page
#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    pub lang: Option<String>,
}

/// Query parameters of the link list
#[derive(Debug, Deserialize)]
pub struct LinksQuery {
    /// Link placement (default: footer)
    pub placement: Option<LinkPlacement>,
    pub lang: Option<String>,
}

/// Link list response
#[derive(Debug, Serialize, Deserialize)]
pub struct LinksResponse {
    pub placement: LinkPlacement,
    pub links: Vec<PageLink>,
}

fn request_language(state: &AppState, explicit: Option<&str>, headers: &HeaderMap) -> String {
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    negotiate_language(explicit, accept_language, state.pages.default_locale())
}

/// Render a page
///
/// # Response
///
/// ```json
/// {
///   "title": "Imprint",
///   "slug": "imprint",
///   "content": "<p>Acme Inc.</p>\n"
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown event, or no page with this slug in the event
pub async fn show_page(
    State(state): State<AppState>,
    Path((organizer, event, slug)): Path<(String, String, String)>,
    Query(query): Query<ShowQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<PublicPage>> {
    let event = state.pages.resolve_event(&organizer, &event).await?;
    let lang = request_language(&state, query.lang.as_deref(), &headers);

    Ok(Json(state.pages.show(&event, &slug, &lang).await?))
}

/// List links to the pages flagged for a placement
pub async fn page_links(
    State(state): State<AppState>,
    Path((organizer, event)): Path<(String, String)>,
    Query(query): Query<LinksQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<LinksResponse>> {
    let event = state.pages.resolve_event(&organizer, &event).await?;
    let lang = request_language(&state, query.lang.as_deref(), &headers);
    let placement = query.placement.unwrap_or(LinkPlacement::Footer);

    let links = state.pages.links(&event, placement, &lang).await?;

    Ok(Json(LinksResponse { placement, links }))
}
