/// Page model and database operations
///
/// A page is a static content document (imprint, terms, FAQ) attached to an
/// event. The slug is unique within its event and never changes after the
/// page has been created.
///
/// Write operations take a `&mut PgConnection` so they can run inside the
/// transaction of a page unit of work; read-only listings take the pool.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE pages (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
///     seq BIGSERIAL NOT NULL,
///     title JSONB NOT NULL,
///     slug VARCHAR(150) NOT NULL,
///     text JSONB NOT NULL DEFAULT '""'::jsonb,
///     link_in_footer BOOLEAN NOT NULL DEFAULT FALSE,
///     link_on_frontpage BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT pages_event_id_slug_key UNIQUE (event_id, slug)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::i18n::I18nString;

/// Name of the unique index on `(event_id, slug)`
pub const PAGE_SLUG_CONSTRAINT: &str = "pages_event_id_slug_key";

const PAGE_COLUMNS: &str =
    "id, event_id, title, slug, text, link_in_footer, link_on_frontpage, created_at, updated_at";

/// A content page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique page ID
    pub id: Uuid,

    /// Event this page belongs to
    pub event_id: Uuid,

    /// Localized title
    pub title: I18nString,

    /// URL form, unique per event
    pub slug: String,

    /// Localized Markdown body
    pub text: I18nString,

    /// Show a link in the event's footer
    pub link_in_footer: bool,

    /// Show a link on the event's front page
    pub link_on_frontpage: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PageRow {
    id: Uuid,
    event_id: Uuid,
    title: Json<I18nString>,
    slug: String,
    text: Json<I18nString>,
    link_in_footer: bool,
    link_on_frontpage: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PageRow> for Page {
    fn from(row: PageRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            title: row.title.0,
            slug: row.slug,
            text: row.text.0,
            link_in_footer: row.link_in_footer,
            link_on_frontpage: row.link_on_frontpage,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for inserting a page
#[derive(Debug, Clone, PartialEq)]
pub struct NewPage {
    pub event_id: Uuid,
    pub title: I18nString,
    pub slug: String,
    pub text: I18nString,
    pub link_in_footer: bool,
    pub link_on_frontpage: bool,
}

/// Where a page link is shown on the public event site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPlacement {
    Footer,
    Frontpage,
}

impl LinkPlacement {
    /// Whether `page` is flagged for this placement
    pub fn matches(&self, page: &Page) -> bool {
        match self {
            LinkPlacement::Footer => page.link_in_footer,
            LinkPlacement::Frontpage => page.link_on_frontpage,
        }
    }
}

impl Page {
    /// Checks whether a page with `slug` exists in the event
    pub async fn slug_exists(
        conn: &mut PgConnection,
        event_id: Uuid,
        slug: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pages WHERE event_id = $1 AND slug = $2)",
        )
        .bind(event_id)
        .bind(slug)
        .fetch_one(conn)
        .await
    }

    /// Finds a page by ID within an event and locks the row for the
    /// surrounding transaction
    pub async fn find_for_update(
        conn: &mut PgConnection,
        event_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE event_id = $1 AND id = $2 FOR UPDATE"
        ))
        .bind(event_id)
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(Page::from))
    }

    /// Inserts a page
    ///
    /// # Errors
    ///
    /// A duplicate `(event_id, slug)` violates [`PAGE_SLUG_CONSTRAINT`].
    pub async fn insert(conn: &mut PgConnection, data: NewPage) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            INSERT INTO pages (event_id, title, slug, text, link_in_footer, link_on_frontpage)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(data.event_id)
        .bind(Json(&data.title))
        .bind(&data.slug)
        .bind(Json(&data.text))
        .bind(data.link_in_footer)
        .bind(data.link_on_frontpage)
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }

    /// Saves the editable fields of a page
    ///
    /// The slug and owning event are never written.
    pub async fn save(conn: &mut PgConnection, page: &Page) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            UPDATE pages
            SET title = $3, text = $4, link_in_footer = $5, link_on_frontpage = $6,
                updated_at = NOW()
            WHERE event_id = $1 AND id = $2
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(page.event_id)
        .bind(page.id)
        .bind(Json(&page.title))
        .bind(Json(&page.text))
        .bind(page.link_in_footer)
        .bind(page.link_on_frontpage)
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }

    /// Deletes a page
    pub async fn delete(conn: &mut PgConnection, event_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pages WHERE event_id = $1 AND id = $2")
            .bind(event_id)
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds a page by ID within an event
    pub async fn find_in_event(pool: &PgPool, event_id: Uuid, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE event_id = $1 AND id = $2"
        ))
        .bind(event_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Page::from))
    }

    /// Finds a page by slug within an event
    pub async fn find_by_slug(pool: &PgPool, event_id: Uuid, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE event_id = $1 AND slug = $2"
        ))
        .bind(event_id)
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Page::from))
    }

    /// Lists an event's pages in creation order
    pub async fn list_by_event(
        pool: &PgPool,
        event_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            SELECT {PAGE_COLUMNS} FROM pages
            WHERE event_id = $1
            ORDER BY seq ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(event_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Page::from).collect())
    }

    /// Counts an event's pages
    pub async fn count_by_event(pool: &PgPool, event_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pages WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Lists pages flagged for a link placement, in creation order
    pub async fn list_linked(
        pool: &PgPool,
        event_id: Uuid,
        placement: LinkPlacement,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let flag = match placement {
            LinkPlacement::Footer => "link_in_footer",
            LinkPlacement::Frontpage => "link_on_frontpage",
        };

        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE event_id = $1 AND {flag} ORDER BY seq ASC"
        ))
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Page::from).collect())
    }
}
