/// Common test utilities for API tests
///
/// Builds the full router over the in-memory page store, with one admin
/// who may manage two events and one user without any grant.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use eventpages_api::app::{build_router, AppState};
use eventpages_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, LocaleConfig};
use eventpages_shared::auth::authorization::{EventPermission, StaticAuthorizer};
use eventpages_shared::auth::jwt::{create_token, Claims};
use eventpages_shared::models::event::EventRef;
use eventpages_shared::pages::memory::MemoryPageStore;
use eventpages_shared::pages::PageService;
use serde_json::Value;
use std::sync::Arc;
use tower::Service as _;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: MemoryPageStore,
    pub app: axum::Router,
    pub event: EventRef,
    pub other_event: EventRef,
    pub admin_token: String,
    pub stranger_token: String,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
        locale: LocaleConfig {
            default_locale: "en".to_string(),
        },
        log_json: false,
    }
}

impl TestContext {
    pub async fn new() -> Self {
        let store = MemoryPageStore::new();
        let event = store.add_event("acme", "conf").await;
        let other_event = store.add_event("acme", "meetup").await;

        let admin = Uuid::new_v4();
        let authorizer = StaticAuthorizer::new()
            .grant(admin, event.id, EventPermission::ManagePages)
            .grant(admin, other_event.id, EventPermission::ManagePages);

        let pages = PageService::new(Arc::new(store.clone()), Arc::new(authorizer));
        let app = build_router(AppState::new(pages, test_config()));

        Self {
            store,
            app,
            event,
            other_event,
            admin_token: create_token(&Claims::new(admin), TEST_SECRET).unwrap(),
            stranger_token: create_token(&Claims::new(Uuid::new_v4()), TEST_SECRET).unwrap(),
        }
    }

    /// Sends a request and returns the status and the JSON body
    /// (`Value::Null` when the body is empty or not JSON)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    /// Management URL prefix of an event
    pub fn control_url(event: &EventRef) -> String {
        format!("/control/event/{}/{}/pages", event.organizer_slug, event.slug)
    }

    /// Creates a page through the API and returns its ID
    pub async fn create_page(&self, event: &EventRef, body: Value) -> String {
        let (status, json) = self
            .post(
                &format!("{}/add", Self::control_url(event)),
                Some(&self.admin_token),
                body,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {json}");

        json["data"]["id"].as_str().unwrap().to_string()
    }
}
