/// In-process page store
///
/// Keeps events, pages and the audit log behind one async mutex. A unit of
/// work holds the lock for its whole lifetime and edits a copy of the state,
/// which replaces the shared state on commit. Dropping the unit releases the
/// lock and discards the copy.
///
/// Enforces the same `(event_id, slug)` uniqueness as the Postgres index.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::store::{PageStore, PageUnit, StoreError};
use crate::models::audit_log::{AuditEntry, NewAuditEntry};
use crate::models::event::EventRef;
use crate::models::page::{LinkPlacement, NewPage, Page, PAGE_SLUG_CONSTRAINT};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    events: Vec<EventRef>,
    /// Creation order
    pages: Vec<Page>,
    /// Append order
    audit: Vec<AuditEntry>,
}

impl MemoryState {
    fn find(&self, event_id: Uuid, id: Uuid) -> Option<&Page> {
        self.pages
            .iter()
            .find(|p| p.event_id == event_id && p.id == id)
    }

    fn slug_exists(&self, event_id: Uuid, slug: &str) -> bool {
        self.pages
            .iter()
            .any(|p| p.event_id == event_id && p.slug == slug)
    }
}

/// Page store held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPageStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an event, reusing the organizer ID of an existing event
    /// with the same organizer slug
    pub async fn add_event(&self, organizer_slug: &str, event_slug: &str) -> EventRef {
        let mut state = self.state.lock().await;

        let organizer_id = state
            .events
            .iter()
            .find(|e| e.organizer_slug == organizer_slug)
            .map(|e| e.organizer_id)
            .unwrap_or_else(Uuid::new_v4);

        let event = EventRef {
            id: Uuid::new_v4(),
            organizer_id,
            organizer_slug: organizer_slug.to_string(),
            slug: event_slug.to_string(),
            name: event_slug.to_string(),
        };
        state.events.push(event.clone());

        event
    }
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn find_event(&self, organizer_slug: &str, event_slug: &str) -> Result<Option<EventRef>, StoreError> {
        let state = self.state.lock().await;

        Ok(state
            .events
            .iter()
            .find(|e| e.organizer_slug == organizer_slug && e.slug == event_slug)
            .cloned())
    }

    async fn find(&self, event_id: Uuid, id: Uuid) -> Result<Option<Page>, StoreError> {
        Ok(self.state.lock().await.find(event_id, id).cloned())
    }

    async fn list(&self, event_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Page>, StoreError> {
        let state = self.state.lock().await;

        Ok(state
            .pages
            .iter()
            .filter(|p| p.event_id == event_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, event_id: Uuid) -> Result<i64, StoreError> {
        let state = self.state.lock().await;

        Ok(state.pages.iter().filter(|p| p.event_id == event_id).count() as i64)
    }

    async fn find_by_slug(&self, event_id: Uuid, slug: &str) -> Result<Option<Page>, StoreError> {
        let state = self.state.lock().await;

        Ok(state
            .pages
            .iter()
            .find(|p| p.event_id == event_id && p.slug == slug)
            .cloned())
    }

    async fn linked(&self, event_id: Uuid, placement: LinkPlacement) -> Result<Vec<Page>, StoreError> {
        let state = self.state.lock().await;

        Ok(state
            .pages
            .iter()
            .filter(|p| p.event_id == event_id && placement.matches(p))
            .cloned()
            .collect())
    }

    async fn audit_trail(&self, event_id: Uuid, limit: i64) -> Result<Vec<AuditEntry>, StoreError> {
        let state = self.state.lock().await;

        Ok(state
            .audit
            .iter()
            .rev()
            .filter(|a| a.event_id == event_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn PageUnit>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();

        Ok(Box::new(MemoryUnit { guard, working }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Unit of work over [`MemoryPageStore`]
pub struct MemoryUnit {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl PageUnit for MemoryUnit {
    async fn slug_exists(&mut self, event_id: Uuid, slug: &str) -> Result<bool, StoreError> {
        Ok(self.working.slug_exists(event_id, slug))
    }

    async fn find(&mut self, event_id: Uuid, id: Uuid) -> Result<Option<Page>, StoreError> {
        Ok(self.working.find(event_id, id).cloned())
    }

    async fn insert(&mut self, page: NewPage) -> Result<Page, StoreError> {
        if self.working.slug_exists(page.event_id, &page.slug) {
            return Err(StoreError::UniqueViolation(PAGE_SLUG_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let page = Page {
            id: Uuid::new_v4(),
            event_id: page.event_id,
            title: page.title,
            slug: page.slug,
            text: page.text,
            link_in_footer: page.link_in_footer,
            link_on_frontpage: page.link_on_frontpage,
            created_at: now,
            updated_at: now,
        };
        self.working.pages.push(page.clone());

        Ok(page)
    }

    async fn update(&mut self, page: &Page) -> Result<Page, StoreError> {
        let stored = self
            .working
            .pages
            .iter_mut()
            .find(|p| p.event_id == page.event_id && p.id == page.id)
            .ok_or_else(|| StoreError::Database(sqlx::Error::RowNotFound))?;

        stored.title = page.title.clone();
        stored.text = page.text.clone();
        stored.link_in_footer = page.link_in_footer;
        stored.link_on_frontpage = page.link_on_frontpage;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn delete(&mut self, event_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let before = self.working.pages.len();
        self.working
            .pages
            .retain(|p| !(p.event_id == event_id && p.id == id));

        Ok(self.working.pages.len() < before)
    }

    async fn log_action(&mut self, entry: NewAuditEntry) -> Result<(), StoreError> {
        self.working.audit.push(AuditEntry {
            id: Uuid::new_v4(),
            event_id: entry.event_id,
            user_id: entry.user_id,
            action_type: entry.action_type,
            object_id: entry.object_id,
            data: entry.data,
            created_at: Utc::now(),
        });

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnit { mut guard, working } = *self;
        *guard = working;

        Ok(())
    }
}
