/// Audit log model
///
/// Append-only record of mutating actions on an event's pages. Entries are
/// keyed by event and reference the page by ID only, so they remain after
/// the page is deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE audit_log (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
///     user_id UUID,
///     action_type VARCHAR(255) NOT NULL,
///     object_id UUID NOT NULL,
///     data JSONB NOT NULL DEFAULT '{}'::jsonb,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// A recorded action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: Uuid,

    /// Event whose audit trail this entry belongs to
    pub event_id: Uuid,

    /// Acting user, if any
    pub user_id: Option<Uuid>,

    /// Action name, e.g. "page.changed"
    pub action_type: String,

    /// ID of the object acted upon
    pub object_id: Uuid,

    /// Action payload (empty object when there is none)
    pub data: JsonValue,

    pub created_at: DateTime<Utc>,
}

/// Input for recording an action
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub event_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action_type: String,
    pub object_id: Uuid,
    pub data: JsonValue,
}

impl NewAuditEntry {
    /// Creates an entry without payload
    pub fn new(event_id: Uuid, user_id: Option<Uuid>, action_type: &str, object_id: Uuid) -> Self {
        Self {
            event_id,
            user_id,
            action_type: action_type.to_string(),
            object_id,
            data: JsonValue::Object(Default::default()),
        }
    }

    /// Attaches a payload
    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = data;
        self
    }
}

impl AuditEntry {
    /// Appends an entry
    pub async fn record(conn: &mut PgConnection, entry: NewAuditEntry) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AuditEntry>(
            r#"
            INSERT INTO audit_log (event_id, user_id, action_type, object_id, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, user_id, action_type, object_id, data, created_at
            "#,
        )
        .bind(entry.event_id)
        .bind(entry.user_id)
        .bind(&entry.action_type)
        .bind(entry.object_id)
        .bind(&entry.data)
        .fetch_one(conn)
        .await
    }

    /// Lists an event's entries, newest first
    pub async fn list_by_event(pool: &PgPool, event_id: Uuid, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, event_id, user_id, action_type, object_id, data, created_at
            FROM audit_log
            WHERE event_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(event_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
