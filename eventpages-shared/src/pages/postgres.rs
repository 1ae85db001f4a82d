/// Postgres page store
///
/// Units of work wrap a `sqlx::Transaction`. Pages fetched inside a unit are
/// locked with `FOR UPDATE` until the unit ends.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::store::{PageStore, PageUnit, StoreError};
use crate::db::pool;
use crate::models::audit_log::{AuditEntry, NewAuditEntry};
use crate::models::event::EventRef;
use crate::models::page::{LinkPlacement, NewPage, Page};

/// Page store backed by a connection pool
#[derive(Clone)]
pub struct PgPageStore {
    pool: PgPool,
}

impl PgPageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PageStore for PgPageStore {
    async fn find_event(&self, organizer_slug: &str, event_slug: &str) -> Result<Option<EventRef>, StoreError> {
        Ok(EventRef::find_by_slugs(&self.pool, organizer_slug, event_slug).await?)
    }

    async fn find(&self, event_id: Uuid, id: Uuid) -> Result<Option<Page>, StoreError> {
        Ok(Page::find_in_event(&self.pool, event_id, id).await?)
    }

    async fn list(&self, event_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Page>, StoreError> {
        Ok(Page::list_by_event(&self.pool, event_id, limit, offset).await?)
    }

    async fn count(&self, event_id: Uuid) -> Result<i64, StoreError> {
        Ok(Page::count_by_event(&self.pool, event_id).await?)
    }

    async fn find_by_slug(&self, event_id: Uuid, slug: &str) -> Result<Option<Page>, StoreError> {
        Ok(Page::find_by_slug(&self.pool, event_id, slug).await?)
    }

    async fn linked(&self, event_id: Uuid, placement: LinkPlacement) -> Result<Vec<Page>, StoreError> {
        Ok(Page::list_linked(&self.pool, event_id, placement).await?)
    }

    async fn audit_trail(&self, event_id: Uuid, limit: i64) -> Result<Vec<AuditEntry>, StoreError> {
        Ok(AuditEntry::list_by_event(&self.pool, event_id, limit).await?)
    }

    async fn begin(&self) -> Result<Box<dyn PageUnit>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgPageUnit { tx }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        pool::health_check(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

/// Unit of work over one Postgres transaction
pub struct PgPageUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PageUnit for PgPageUnit {
    async fn slug_exists(&mut self, event_id: Uuid, slug: &str) -> Result<bool, StoreError> {
        Ok(Page::slug_exists(&mut *self.tx, event_id, slug).await?)
    }

    async fn find(&mut self, event_id: Uuid, id: Uuid) -> Result<Option<Page>, StoreError> {
        Ok(Page::find_for_update(&mut *self.tx, event_id, id).await?)
    }

    async fn insert(&mut self, page: NewPage) -> Result<Page, StoreError> {
        Ok(Page::insert(&mut *self.tx, page).await?)
    }

    async fn update(&mut self, page: &Page) -> Result<Page, StoreError> {
        Ok(Page::save(&mut *self.tx, page).await?)
    }

    async fn delete(&mut self, event_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        Ok(Page::delete(&mut *self.tx, event_id, id).await?)
    }

    async fn log_action(&mut self, entry: NewAuditEntry) -> Result<(), StoreError> {
        AuditEntry::record(&mut *self.tx, entry).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let PgPageUnit { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
