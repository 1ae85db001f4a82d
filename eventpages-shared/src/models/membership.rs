/// Organizer membership model
///
/// Memberships are owned by the host application: a user belongs to an
/// organizer with a role, and the role decides what the user may do on the
/// organizer's events. This crate only reads them (and creates them in tests
/// and seeding).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE membership_role AS ENUM ('owner', 'admin', 'member', 'viewer');
///
/// CREATE TABLE memberships (
///     organizer_id UUID NOT NULL REFERENCES organizers(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL,
///     role membership_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (organizer_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Roles a user can hold within an organizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    /// Full control over the organizer and its events
    Owner,

    /// Can change event settings, including content pages
    Admin,

    /// Day-to-day event work, no settings
    Member,

    /// Read-only access
    Viewer,
}

impl MembershipRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "owner",
            MembershipRole::Admin => "admin",
            MembershipRole::Member => "member",
            MembershipRole::Viewer => "viewer",
        }
    }

    /// Checks if this role is at least as strong as `required`
    ///
    /// Hierarchy: Owner > Admin > Member > Viewer
    pub fn has_permission(&self, required: &MembershipRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            MembershipRole::Owner => 4,
            MembershipRole::Admin => 3,
            MembershipRole::Member => 2,
            MembershipRole::Viewer => 1,
        }
    }
}

/// A user's role within an organizer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Organizer ID
    pub organizer_id: Uuid,

    /// User ID (issued by the host's identity provider)
    pub user_id: Uuid,

    /// Role within the organizer
    pub role: MembershipRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub organizer_id: Uuid,
    pub user_id: Uuid,
    pub role: MembershipRole,
}

impl Membership {
    /// Creates a membership
    pub async fn create(pool: &PgPool, data: CreateMembership) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (organizer_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING organizer_id, user_id, role, created_at
            "#,
        )
        .bind(data.organizer_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await
    }

    /// Gets a user's role in an organizer
    ///
    /// # Returns
    ///
    /// The role if the user is a member, None otherwise
    pub async fn get_role(
        pool: &PgPool,
        organizer_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MembershipRole>, sqlx::Error> {
        let role: Option<MembershipRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM memberships
            WHERE organizer_id = $1 AND user_id = $2
            "#,
        )
        .bind(organizer_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }
}
