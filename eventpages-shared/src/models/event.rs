/// Organizers and events
///
/// Both are host-owned. Pages are scoped to an event, and an event is
/// addressed in URLs by the pair (organizer slug, event slug).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE organizers (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     slug VARCHAR(50) NOT NULL UNIQUE,
///     name VARCHAR(200) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     organizer_id UUID NOT NULL REFERENCES organizers(id) ON DELETE CASCADE,
///     slug VARCHAR(50) NOT NULL,
///     name VARCHAR(200) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (organizer_id, slug)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Organizer row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organizer {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

/// An event together with the organizer slug it is addressed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRef {
    /// Event ID
    pub id: Uuid,

    /// Owning organizer
    pub organizer_id: Uuid,

    /// Organizer URL slug
    pub organizer_slug: String,

    /// Event URL slug
    pub slug: String,

    /// Display name
    pub name: String,
}

impl Organizer {
    /// Creates an organizer
    pub async fn create(pool: &PgPool, slug: &str, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Organizer>(
            r#"
            INSERT INTO organizers (slug, name)
            VALUES ($1, $2)
            RETURNING id, slug, name
            "#,
        )
        .bind(slug)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Deletes an organizer and, by cascade, its events, pages and audit log
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM organizers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl EventRef {
    /// Creates an event under an organizer
    pub async fn create(
        pool: &PgPool,
        organizer: &Organizer,
        slug: &str,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO events (organizer_id, slug, name)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(organizer.id)
        .bind(slug)
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(Self {
            id,
            organizer_id: organizer.id,
            organizer_slug: organizer.slug.clone(),
            slug: slug.to_string(),
            name: name.to_string(),
        })
    }

    /// Resolves an event from its URL slugs
    pub async fn find_by_slugs(
        pool: &PgPool,
        organizer_slug: &str,
        event_slug: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, EventRef>(
            r#"
            SELECT e.id, e.organizer_id, o.slug AS organizer_slug, e.slug, e.name
            FROM events e
            JOIN organizers o ON o.id = e.organizer_id
            WHERE o.slug = $1 AND e.slug = $2
            "#,
        )
        .bind(organizer_slug)
        .bind(event_slug)
        .fetch_optional(pool)
        .await
    }
}
