/// Page lifecycle operations
///
/// Control operations check `ManagePages` on the event before touching any
/// page, then run their lookup, validation, write and audit entry inside one
/// unit of work. An error at any step drops the unit, so nothing is written.
///
/// Public operations (`show`, `links`) need no actor.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::PageError;
use super::form::{EditPageForm, PageForm};
use super::render::{PageLink, PublicPage};
use super::slug::{conflict_to_duplicate, ensure_unique};
use super::store::PageStore;
use super::{PAGE_ADDED, PAGE_CHANGED, PAGE_DELETED};
use crate::auth::authorization::{require_permission, EventAuthorizer, EventPermission};
use crate::auth::middleware::AuthContext;
use crate::models::audit_log::{AuditEntry, NewAuditEntry};
use crate::models::event::EventRef;
use crate::models::page::{LinkPlacement, Page};
use crate::notification::Notification;

/// Pages per list batch
pub const PAGE_SIZE: i64 = 20;

/// Maximum number of audit entries returned by `audit_trail`
pub const AUDIT_TRAIL_LIMIT: i64 = 200;

pub const MSG_CREATED: &str = "The new page has been created.";
pub const MSG_SAVED: &str = "Your changes have been saved.";
pub const MSG_DELETED: &str = "The selected page has been deleted.";

/// One batch of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,

    /// 1-based batch number
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Window of a batch within a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub num_pages: i64,
}

/// Computes the offset of batch `page_number` over `total` items
///
/// Batch 1 always exists, even for an empty listing. Any other batch
/// outside `1..=num_pages` is `NotFound`.
pub fn page_window(page_number: i64, total: i64, per_page: i64) -> Result<PageWindow, PageError> {
    let num_pages = ((total + per_page - 1) / per_page).max(1);

    if page_number < 1 || page_number > num_pages {
        return Err(PageError::NotFound);
    }

    Ok(PageWindow {
        offset: (page_number - 1) * per_page,
        num_pages,
    })
}

/// Result of a mutation plus the message for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub value: T,
    pub notification: Notification,
}

impl<T> Outcome<T> {
    fn success(value: T, text: &str) -> Self {
        Self {
            value,
            notification: Notification::success(text),
        }
    }
}

/// Page operations over a store and an authorizer
#[derive(Clone)]
pub struct PageService {
    store: Arc<dyn PageStore>,
    authorizer: Arc<dyn EventAuthorizer>,
    default_locale: String,
}

impl PageService {
    pub fn new(store: Arc<dyn PageStore>, authorizer: Arc<dyn EventAuthorizer>) -> Self {
        Self {
            store,
            authorizer,
            default_locale: "en".to_string(),
        }
    }

    /// Sets the language used when a translation for the request language is missing
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.store
    }

    /// Fails with `Forbidden` unless `actor` may manage the event's pages
    pub async fn authorize(&self, actor: &AuthContext, event: &EventRef) -> Result<(), PageError> {
        require_permission(self.authorizer.as_ref(), actor, event, EventPermission::ManagePages).await?;
        Ok(())
    }

    /// Resolves an event from its URL slugs
    pub async fn resolve_event(&self, organizer_slug: &str, event_slug: &str) -> Result<EventRef, PageError> {
        self.store
            .find_event(organizer_slug, event_slug)
            .await?
            .ok_or(PageError::NotFound)
    }

    /// Lists one batch of the event's pages in creation order
    pub async fn list(
        &self,
        actor: &AuthContext,
        event: &EventRef,
        page_number: i64,
    ) -> Result<Paginated<Page>, PageError> {
        self.authorize(actor, event).await?;

        let total = self.store.count(event.id).await?;
        let window = page_window(page_number, total, PAGE_SIZE)?;
        let items = self.store.list(event.id, PAGE_SIZE, window.offset).await?;

        Ok(Paginated {
            items,
            page: page_number,
            per_page: PAGE_SIZE,
            total,
            num_pages: window.num_pages,
            has_next: page_number < window.num_pages,
            has_previous: page_number > 1,
        })
    }

    /// Gets a page of the event, for the edit and delete forms
    pub async fn get(&self, actor: &AuthContext, event: &EventRef, id: Uuid) -> Result<Page, PageError> {
        self.authorize(actor, event).await?;

        self.store.find(event.id, id).await?.ok_or(PageError::NotFound)
    }

    /// Creates a page and records `page.added`
    pub async fn create(
        &self,
        actor: &AuthContext,
        event: &EventRef,
        form: PageForm,
    ) -> Result<Outcome<Page>, PageError> {
        self.authorize(actor, event).await?;
        form.clean()?;

        let mut unit = self.store.begin().await?;
        ensure_unique(&mut *unit, event.id, &form.slug).await?;

        let slug = form.slug.clone();
        let audit_data = form.audit_data();
        let page = unit
            .insert(form.into_new_page(event.id))
            .await
            .map_err(|e| conflict_to_duplicate(e, &slug))?;

        unit.log_action(
            NewAuditEntry::new(event.id, Some(actor.user_id), PAGE_ADDED, page.id).with_data(audit_data),
        )
        .await?;
        unit.commit().await?;

        info!(
            event_id = %event.id,
            page_id = %page.id,
            slug = %page.slug,
            user_id = %actor.user_id,
            "Page created"
        );

        Ok(Outcome::success(page, MSG_CREATED))
    }

    /// Saves the editable fields of a page
    ///
    /// The stored slug is kept whatever was submitted. `page.changed` is
    /// recorded with the changed fields only, and not at all when nothing
    /// changed.
    pub async fn update(
        &self,
        actor: &AuthContext,
        event: &EventRef,
        id: Uuid,
        form: EditPageForm,
    ) -> Result<Outcome<Page>, PageError> {
        self.authorize(actor, event).await?;

        let mut unit = self.store.begin().await?;
        let mut page = unit.find(event.id, id).await?.ok_or(PageError::NotFound)?;

        form.clean()?;
        let changes = form.changes(&page);
        form.apply_to(&mut page);

        let page = unit.update(&page).await?;

        if changes.is_empty() {
            debug!(event_id = %event.id, page_id = %page.id, "Page saved without changes");
        } else {
            unit.log_action(
                NewAuditEntry::new(event.id, Some(actor.user_id), PAGE_CHANGED, page.id)
                    .with_data(serde_json::Value::Object(changes)),
            )
            .await?;
        }
        unit.commit().await?;

        info!(
            event_id = %event.id,
            page_id = %page.id,
            user_id = %actor.user_id,
            "Page updated"
        );

        Ok(Outcome::success(page, MSG_SAVED))
    }

    /// Deletes a page, recording `page.deleted` first
    pub async fn delete(&self, actor: &AuthContext, event: &EventRef, id: Uuid) -> Result<Outcome<Uuid>, PageError> {
        self.authorize(actor, event).await?;

        let mut unit = self.store.begin().await?;
        let page = unit.find(event.id, id).await?.ok_or(PageError::NotFound)?;

        unit.log_action(NewAuditEntry::new(
            event.id,
            Some(actor.user_id),
            PAGE_DELETED,
            page.id,
        ))
        .await?;

        if !unit.delete(event.id, page.id).await? {
            return Err(PageError::NotFound);
        }
        unit.commit().await?;

        info!(
            event_id = %event.id,
            page_id = %page.id,
            slug = %page.slug,
            user_id = %actor.user_id,
            "Page deleted"
        );

        Ok(Outcome::success(page.id, MSG_DELETED))
    }

    /// Lists the event's page audit entries, newest first
    pub async fn audit_trail(&self, actor: &AuthContext, event: &EventRef) -> Result<Vec<AuditEntry>, PageError> {
        self.authorize(actor, event).await?;

        Ok(self.store.audit_trail(event.id, AUDIT_TRAIL_LIMIT).await?)
    }

    /// Renders the page published under `slug`
    pub async fn show(&self, event: &EventRef, slug: &str, lang: &str) -> Result<PublicPage, PageError> {
        let page = self
            .store
            .find_by_slug(event.id, slug)
            .await?
            .ok_or(PageError::NotFound)?;

        Ok(PublicPage::render(&page, lang, &self.default_locale))
    }

    /// Links to the pages flagged for `placement`
    pub async fn links(
        &self,
        event: &EventRef,
        placement: LinkPlacement,
        lang: &str,
    ) -> Result<Vec<PageLink>, PageError> {
        let pages = self.store.linked(event.id, placement).await?;

        Ok(pages
            .iter()
            .map(|page| PageLink::new(event, page, lang, &self.default_locale))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authorization::{AuthzError, StaticAuthorizer};
    use crate::i18n::I18nString;
    use crate::models::page::NewPage;
    use crate::pages::memory::MemoryPageStore;
    use crate::pages::store::{PageUnit, StoreError};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        service: PageService,
        store: MemoryPageStore,
        admin: AuthContext,
        event: EventRef,
        other_event: EventRef,
    }

    async fn fixture() -> Fixture {
        let store = MemoryPageStore::new();
        let event = store.add_event("acme", "conf").await;
        let other_event = store.add_event("acme", "meetup").await;
        let admin = AuthContext::new(Uuid::new_v4());

        let authorizer = StaticAuthorizer::new()
            .grant(admin.user_id, event.id, EventPermission::ManagePages)
            .grant(admin.user_id, other_event.id, EventPermission::ManagePages);

        Fixture {
            service: PageService::new(Arc::new(store.clone()), Arc::new(authorizer)),
            store,
            admin,
            event,
            other_event,
        }
    }

    fn form(slug: &str) -> PageForm {
        PageForm {
            title: I18nString::from("Imprint"),
            slug: slug.to_string(),
            text: I18nString::from("Acme Inc."),
            ..Default::default()
        }
    }

    #[test]
    fn test_page_window() {
        assert_eq!(
            page_window(1, 0, 20).unwrap(),
            PageWindow { offset: 0, num_pages: 1 }
        );
        assert_eq!(
            page_window(2, 21, 20).unwrap(),
            PageWindow { offset: 20, num_pages: 2 }
        );
        assert!(matches!(page_window(2, 20, 20), Err(PageError::NotFound)));
        assert!(matches!(page_window(0, 5, 20), Err(PageError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_then_duplicate_slug() {
        let f = fixture().await;

        let outcome = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap();
        assert_eq!(outcome.notification.text, MSG_CREATED);
        assert_eq!(outcome.value.slug, "imprint");

        let err = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap_err();
        assert!(matches!(err, PageError::DuplicateSlug { ref slug } if slug == "imprint"));
        assert_eq!(f.store.count(f.event.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_same_slug_allowed_in_other_event() {
        let f = fixture().await;

        f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap();
        f.service.create(&f.admin, &f.other_event, form("imprint")).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_records_all_submitted_fields() {
        let f = fixture().await;

        let page = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap().value;

        let trail = f.service.audit_trail(&f.admin, &f.event).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action_type, PAGE_ADDED);
        assert_eq!(trail[0].object_id, page.id);
        assert_eq!(trail[0].user_id, Some(f.admin.user_id));
        assert_eq!(trail[0].data, form("imprint").audit_data());
    }

    #[tokio::test]
    async fn test_invalid_form_writes_nothing() {
        let f = fixture().await;

        let err = f.service.create(&f.admin, &f.event, form("bad slug")).await.unwrap_err();
        assert!(matches!(err, PageError::Invalid(_)));
        assert_eq!(f.store.count(f.event.id).await.unwrap(), 0);
        assert!(f.service.audit_trail(&f.admin, &f.event).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_slug() {
        let f = fixture().await;
        let page = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap().value;

        let edit = EditPageForm {
            title: I18nString::from("Legal notice"),
            slug: Some("changed".to_string()),
            ..EditPageForm::from(&page)
        };
        let outcome = f.service.update(&f.admin, &f.event, page.id, edit).await.unwrap();

        assert_eq!(outcome.notification.text, MSG_SAVED);
        assert_eq!(outcome.value.slug, "imprint");
        assert_eq!(outcome.value.title, I18nString::from("Legal notice"));
        assert!(f.store.find_by_slug(f.event.id, "changed").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identical_update_records_nothing() {
        let f = fixture().await;
        let page = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap().value;

        let outcome = f
            .service
            .update(&f.admin, &f.event, page.id, EditPageForm::from(&page))
            .await
            .unwrap();
        assert_eq!(outcome.notification.text, MSG_SAVED);

        let trail = f.service.audit_trail(&f.admin, &f.event).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action_type, PAGE_ADDED);
    }

    #[tokio::test]
    async fn test_single_field_update_records_only_that_field() {
        let f = fixture().await;
        let page = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap().value;

        let edit = EditPageForm {
            link_in_footer: true,
            ..EditPageForm::from(&page)
        };
        f.service.update(&f.admin, &f.event, page.id, edit).await.unwrap();

        let trail = f.service.audit_trail(&f.admin, &f.event).await.unwrap();
        assert_eq!(trail[0].action_type, PAGE_CHANGED);
        assert_eq!(trail[0].data, serde_json::json!({ "link_in_footer": true }));
    }

    #[tokio::test]
    async fn test_delete_then_lookup_is_not_found() {
        let f = fixture().await;
        let page = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap().value;

        let outcome = f.service.delete(&f.admin, &f.event, page.id).await.unwrap();
        assert_eq!(outcome.value, page.id);
        assert_eq!(outcome.notification.text, MSG_DELETED);

        assert!(matches!(
            f.service.get(&f.admin, &f.event, page.id).await,
            Err(PageError::NotFound)
        ));

        let trail = f.service.audit_trail(&f.admin, &f.event).await.unwrap();
        assert_eq!(trail[0].action_type, PAGE_DELETED);
        assert_eq!(trail[0].object_id, page.id);
        assert_eq!(trail[0].data, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_pages_are_scoped_to_their_event() {
        let f = fixture().await;
        let page = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap().value;

        let other = &f.other_event;
        assert!(matches!(f.service.get(&f.admin, other, page.id).await, Err(PageError::NotFound)));
        assert!(matches!(
            f.service.update(&f.admin, other, page.id, EditPageForm::from(&page)).await,
            Err(PageError::NotFound)
        ));
        assert!(matches!(f.service.delete(&f.admin, other, page.id).await, Err(PageError::NotFound)));
        assert!(matches!(f.service.show(other, "imprint", "en").await, Err(PageError::NotFound)));

        assert!(f.service.get(&f.admin, &f.event, page.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_public_render_scenario() {
        let f = fixture().await;
        f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap();

        let rendered = f.service.show(&f.event, "imprint", "en").await.unwrap();
        assert_eq!(rendered.title, "Imprint");
        assert_eq!(rendered.slug, "imprint");
        assert!(rendered.content.contains("Acme Inc."));

        assert!(matches!(
            f.service.show(&f.other_event, "imprint", "en").await,
            Err(PageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_show_localizes_with_default_locale_fallback() {
        let f = fixture().await;
        let service = f.service.clone().with_default_locale("de");

        let mut title = BTreeMap::new();
        title.insert("de".to_string(), "Impressum".to_string());
        title.insert("en".to_string(), "Imprint".to_string());
        let page_form = PageForm {
            title: I18nString::Localized(title),
            ..form("imprint")
        };
        service.create(&f.admin, &f.event, page_form).await.unwrap();

        assert_eq!(service.show(&f.event, "imprint", "en").await.unwrap().title, "Imprint");
        assert_eq!(service.show(&f.event, "imprint", "fr").await.unwrap().title, "Impressum");
    }

    #[tokio::test]
    async fn test_links_filter_by_placement() {
        let f = fixture().await;
        f.service
            .create(
                &f.admin,
                &f.event,
                PageForm {
                    link_in_footer: true,
                    ..form("imprint")
                },
            )
            .await
            .unwrap();
        f.service
            .create(
                &f.admin,
                &f.event,
                PageForm {
                    link_on_frontpage: true,
                    ..form("faq")
                },
            )
            .await
            .unwrap();

        let footer = f.service.links(&f.event, LinkPlacement::Footer, "en").await.unwrap();
        assert_eq!(footer.len(), 1);
        assert_eq!(footer[0].url, "/acme/conf/page/imprint");

        let frontpage = f.service.links(&f.event, LinkPlacement::Frontpage, "en").await.unwrap();
        assert_eq!(frontpage[0].slug, "faq");
    }

    #[tokio::test]
    async fn test_list_paginates_by_twenty() {
        let f = fixture().await;
        for i in 0..25 {
            f.service
                .create(&f.admin, &f.event, form(&format!("page-{i}")))
                .await
                .unwrap();
        }

        let first = f.service.list(&f.admin, &f.event, 1).await.unwrap();
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.items[0].slug, "page-0");
        assert_eq!(first.total, 25);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let second = f.service.list(&f.admin, &f.event, 2).await.unwrap();
        assert_eq!(second.items.len(), 5);
        assert!(second.has_previous);

        assert!(matches!(f.service.list(&f.admin, &f.event, 3).await, Err(PageError::NotFound)));
    }

    #[tokio::test]
    async fn test_empty_list_first_page() {
        let f = fixture().await;

        let page = f.service.list(&f.admin, &f.event, 1).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.num_pages, 1);
    }

    #[tokio::test]
    async fn test_resolve_event() {
        let f = fixture().await;

        assert_eq!(f.service.resolve_event("acme", "conf").await.unwrap(), f.event);
        assert!(matches!(
            f.service.resolve_event("acme", "missing").await,
            Err(PageError::NotFound)
        ));
    }

    /// Store that counts reads and refuses audit writes
    #[derive(Clone)]
    struct FailingAuditStore {
        inner: MemoryPageStore,
        lookups: Arc<AtomicUsize>,
    }

    struct FailingAuditUnit {
        inner: Box<dyn PageUnit>,
        lookups: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageStore for FailingAuditStore {
        async fn find_event(&self, o: &str, e: &str) -> Result<Option<EventRef>, StoreError> {
            self.inner.find_event(o, e).await
        }

        async fn find(&self, event_id: Uuid, id: Uuid) -> Result<Option<Page>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find(event_id, id).await
        }

        async fn list(&self, event_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Page>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.list(event_id, limit, offset).await
        }

        async fn count(&self, event_id: Uuid) -> Result<i64, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.count(event_id).await
        }

        async fn find_by_slug(&self, event_id: Uuid, slug: &str) -> Result<Option<Page>, StoreError> {
            self.inner.find_by_slug(event_id, slug).await
        }

        async fn linked(&self, event_id: Uuid, placement: LinkPlacement) -> Result<Vec<Page>, StoreError> {
            self.inner.linked(event_id, placement).await
        }

        async fn audit_trail(&self, event_id: Uuid, limit: i64) -> Result<Vec<AuditEntry>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.audit_trail(event_id, limit).await
        }

        async fn begin(&self) -> Result<Box<dyn PageUnit>, StoreError> {
            Ok(Box::new(FailingAuditUnit {
                inner: self.inner.begin().await?,
                lookups: self.lookups.clone(),
            }))
        }

        async fn health_check(&self) -> Result<(), StoreError> {
            self.inner.health_check().await
        }
    }

    #[async_trait]
    impl PageUnit for FailingAuditUnit {
        async fn slug_exists(&mut self, event_id: Uuid, slug: &str) -> Result<bool, StoreError> {
            self.inner.slug_exists(event_id, slug).await
        }

        async fn find(&mut self, event_id: Uuid, id: Uuid) -> Result<Option<Page>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find(event_id, id).await
        }

        async fn insert(&mut self, page: NewPage) -> Result<Page, StoreError> {
            self.inner.insert(page).await
        }

        async fn update(&mut self, page: &Page) -> Result<Page, StoreError> {
            self.inner.update(page).await
        }

        async fn delete(&mut self, event_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
            self.inner.delete(event_id, id).await
        }

        async fn log_action(&mut self, _entry: NewAuditEntry) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("audit log offline".to_string()))
        }

        async fn commit(self: Box<Self>) -> Result<(), StoreError> {
            self.inner.commit().await
        }
    }

    #[tokio::test]
    async fn test_failed_audit_rolls_back_every_mutation() {
        let f = fixture().await;
        let page = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap().value;

        let failing = FailingAuditStore {
            inner: f.store.clone(),
            lookups: Arc::new(AtomicUsize::new(0)),
        };
        let authorizer = StaticAuthorizer::new().grant(f.admin.user_id, f.event.id, EventPermission::ManagePages);
        let service = PageService::new(Arc::new(failing), Arc::new(authorizer));

        let err = service.create(&f.admin, &f.event, form("faq")).await.unwrap_err();
        assert!(matches!(err, PageError::Store(StoreError::Unavailable(_))));
        assert!(f.store.find_by_slug(f.event.id, "faq").await.unwrap().is_none());

        let edit = EditPageForm {
            title: I18nString::from("Changed"),
            ..EditPageForm::from(&page)
        };
        assert!(service.update(&f.admin, &f.event, page.id, edit).await.is_err());
        assert_eq!(f.store.find(f.event.id, page.id).await.unwrap(), Some(page.clone()));

        assert!(service.delete(&f.admin, &f.event, page.id).await.is_err());
        assert!(f.store.find(f.event.id, page.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_forbidden_actor_never_reaches_lookup() {
        let f = fixture().await;
        let page = f.service.create(&f.admin, &f.event, form("imprint")).await.unwrap().value;

        let lookups = Arc::new(AtomicUsize::new(0));
        let store = FailingAuditStore {
            inner: f.store.clone(),
            lookups: lookups.clone(),
        };
        let service = PageService::new(Arc::new(store), Arc::new(StaticAuthorizer::new()));
        let stranger = AuthContext::new(Uuid::new_v4());

        assert!(matches!(service.list(&stranger, &f.event, 1).await, Err(PageError::Forbidden)));
        assert!(matches!(service.get(&stranger, &f.event, page.id).await, Err(PageError::Forbidden)));
        assert!(matches!(
            service.get(&stranger, &f.event, Uuid::new_v4()).await,
            Err(PageError::Forbidden)
        ));
        assert!(matches!(
            service.create(&stranger, &f.event, form("faq")).await,
            Err(PageError::Forbidden)
        ));
        assert!(matches!(
            service.update(&stranger, &f.event, page.id, EditPageForm::from(&page)).await,
            Err(PageError::Forbidden)
        ));
        assert!(matches!(service.delete(&stranger, &f.event, page.id).await, Err(PageError::Forbidden)));
        assert!(matches!(service.audit_trail(&stranger, &f.event).await, Err(PageError::Forbidden)));

        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    /// Authorizer whose backend is down
    struct BrokenAuthorizer;

    #[async_trait]
    impl EventAuthorizer for BrokenAuthorizer {
        async fn has_permission(
            &self,
            _user_id: Uuid,
            _event: &EventRef,
            _permission: EventPermission,
        ) -> Result<bool, AuthzError> {
            Err(AuthzError::DatabaseError(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn test_authorizer_failure_is_not_forbidden() {
        let f = fixture().await;
        let service = PageService::new(Arc::new(f.store.clone()), Arc::new(BrokenAuthorizer));

        let err = service.list(&f.admin, &f.event, 1).await.unwrap_err();
        assert!(matches!(err, PageError::Authorization(_)));
    }
}
