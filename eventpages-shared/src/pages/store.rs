/// Page persistence port
///
/// Reads go straight through [`PageStore`]. Every mutation runs inside a
/// [`PageUnit`] obtained from [`PageStore::begin`]: the unit sees its own
/// writes, and nothing becomes visible until [`PageUnit::commit`]. Dropping a
/// unit without committing discards all of its writes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::audit_log::{AuditEntry, NewAuditEntry};
use crate::models::event::EventRef;
use crate::models::page::{LinkPlacement, NewPage, Page};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (carries the constraint name)
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// The backend cannot serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(
                    db_err.constraint().unwrap_or_default().to_string(),
                );
            }
        }

        StoreError::Database(err)
    }
}

/// Read access to pages and the entry point for units of work
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Resolves an event by organizer and event slug
    async fn find_event(&self, organizer_slug: &str, event_slug: &str) -> Result<Option<EventRef>, StoreError>;

    /// Finds a page by ID within an event
    async fn find(&self, event_id: Uuid, id: Uuid) -> Result<Option<Page>, StoreError>;

    /// Lists an event's pages in creation order
    async fn list(&self, event_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Page>, StoreError>;

    /// Counts an event's pages
    async fn count(&self, event_id: Uuid) -> Result<i64, StoreError>;

    /// Finds a page by exact slug within an event
    async fn find_by_slug(&self, event_id: Uuid, slug: &str) -> Result<Option<Page>, StoreError>;

    /// Lists pages flagged for a link placement, in creation order
    async fn linked(&self, event_id: Uuid, placement: LinkPlacement) -> Result<Vec<Page>, StoreError>;

    /// Lists an event's audit entries, newest first
    async fn audit_trail(&self, event_id: Uuid, limit: i64) -> Result<Vec<AuditEntry>, StoreError>;

    /// Starts a unit of work
    async fn begin(&self) -> Result<Box<dyn PageUnit>, StoreError>;

    /// Checks that the backend is reachable
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// One atomic unit of work
#[async_trait]
pub trait PageUnit: Send {
    /// Whether a page with `slug` exists in the event
    async fn slug_exists(&mut self, event_id: Uuid, slug: &str) -> Result<bool, StoreError>;

    /// Finds a page by ID within an event, for modification
    async fn find(&mut self, event_id: Uuid, id: Uuid) -> Result<Option<Page>, StoreError>;

    /// Inserts a page
    async fn insert(&mut self, page: NewPage) -> Result<Page, StoreError>;

    /// Saves the editable fields of an existing page
    async fn update(&mut self, page: &Page) -> Result<Page, StoreError>;

    /// Deletes a page, returning whether it existed
    async fn delete(&mut self, event_id: Uuid, id: Uuid) -> Result<bool, StoreError>;

    /// Appends an audit entry
    async fn log_action(&mut self, entry: NewAuditEntry) -> Result<(), StoreError>;

    /// Makes every write of this unit visible
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
