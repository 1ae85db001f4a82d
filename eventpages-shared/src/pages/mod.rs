/// Event content pages
///
/// This module holds the page lifecycle: validation of the create and edit
/// forms, slug uniqueness, the persistence port with its Postgres and
/// in-memory implementations, the service that runs each operation as one
/// unit of work with its audit entry, and the public renderer.
///
/// # Modules
///
/// - `error`: `PageError` and field-level errors
/// - `slug`: Slug syntax and per-event uniqueness
/// - `form`: Create and edit form contracts, change detection
/// - `store`: `PageStore` / `PageUnit` ports
/// - `postgres`: sqlx-backed store
/// - `memory`: In-process store
/// - `service`: `PageService` operations
/// - `render`: Public page rendering

pub mod error;
pub mod form;
pub mod memory;
pub mod postgres;
pub mod render;
pub mod service;
pub mod slug;
pub mod store;

pub use error::{FieldError, PageError};
pub use form::{EditPageForm, PageForm};
pub use service::{Outcome, Paginated, PageService, PAGE_SIZE};
pub use store::{PageStore, PageUnit, StoreError};

/// Audit action recorded when a page is created
pub const PAGE_ADDED: &str = "page.added";

/// Audit action recorded when a page's fields change
pub const PAGE_CHANGED: &str = "page.changed";

/// Audit action recorded before a page is deleted
pub const PAGE_DELETED: &str = "page.deleted";
