/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use eventpages_api::{app::AppState, config::Config};
/// use eventpages_shared::auth::authorization::MembershipAuthorizer;
/// use eventpages_shared::db::pool::{create_pool, DatabaseConfig};
/// use eventpages_shared::pages::{postgres::PgPageStore, PageService};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..DatabaseConfig::default()
/// })
/// .await?;
/// let pages = PageService::new(
///     Arc::new(PgPageStore::new(pool.clone())),
///     Arc::new(MembershipAuthorizer::new(pool)),
/// );
/// let app = eventpages_api::app::build_router(AppState::new(pages, config));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use eventpages_shared::auth::middleware::authenticate_bearer;
use eventpages_shared::pages::PageService;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Path prefix of the page management routes
pub const CONTROL_PREFIX: &str = "/control/event/:organizer/:event/pages";

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Page operations
    pub pages: PageService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    ///
    /// The service's fallback language is taken from the configuration.
    pub fn new(pages: PageService, config: Config) -> Self {
        Self {
            pages: pages.with_default_locale(config.locale.default_locale.clone()),
            config: Arc::new(config),
        }
    }

    /// Gets the secret used to verify bearer tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                   # Store connectivity (public)
/// ├── /control/event/:organizer/:event/pages/   # Page management (bearer token)
/// │   ├── GET  /            ?page=N             # List
/// │   ├── POST /add                             # Create
/// │   ├── GET  /:page/edit                      # Edit form
/// │   ├── POST /:page/edit                      # Update
/// │   ├── GET  /:page/delete                    # Delete confirmation
/// │   ├── POST /:page/delete                    # Delete
/// │   └── GET  /logs                            # Audit trail
/// └── /:organizer/:event/                       # Public (no auth)
///     ├── GET /page/:slug                       # Rendered page
///     └── GET /page-links ?placement=footer     # Footer / front page links
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (control routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let control_routes = Router::new()
        .route(CONTROL_PREFIX, get(routes::pages::list_pages))
        .route(&format!("{CONTROL_PREFIX}/"), get(routes::pages::list_pages))
        .route(&format!("{CONTROL_PREFIX}/add"), post(routes::pages::create_page))
        .route(
            &format!("{CONTROL_PREFIX}/:page/edit"),
            get(routes::pages::edit_form).post(routes::pages::update_page),
        )
        .route(
            &format!("{CONTROL_PREFIX}/:page/delete"),
            get(routes::pages::delete_confirmation).post(routes::pages::delete_page),
        )
        .route(&format!("{CONTROL_PREFIX}/logs"), get(routes::pages::audit_trail))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let public_routes = Router::new()
        .route("/:organizer/:event/page/:slug", get(routes::public::show_page))
        .route("/:organizer/:event/page-links", get(routes::public::page_links));

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT_LANGUAGE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .merge(control_routes)
        .merge(public_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the bearer token from the Authorization header, then injects
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_context = authenticate_bearer(auth_header, state.jwt_secret())?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
