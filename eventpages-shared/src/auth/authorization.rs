/// Event authorization
///
/// Every control operation on pages starts with an explicit permission check
/// against the [`EventAuthorizer`] port, before any page is looked up.
///
/// # Implementations
///
/// - [`MembershipAuthorizer`]: reads the user's organizer role from Postgres
/// - [`StaticAuthorizer`]: fixed in-process grants, for embedding and tests
///
/// # Example
///
/// ```no_run
/// use eventpages_shared::auth::authorization::{require_permission, EventPermission, MembershipAuthorizer};
/// use eventpages_shared::auth::middleware::AuthContext;
/// use eventpages_shared::models::event::EventRef;
/// use sqlx::PgPool;
///
/// async fn check(pool: PgPool, auth: &AuthContext, event: &EventRef) -> Result<(), Box<dyn std::error::Error>> {
///     let authorizer = MembershipAuthorizer::new(pool);
///     require_permission(&authorizer, auth, event, EventPermission::ManagePages).await?;
///     Ok(())
/// }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::event::EventRef;
use crate::models::membership::{Membership, MembershipRole};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The user lacks the permission on this event
    #[error("Missing permission {permission} on event {event_id}")]
    Forbidden {
        permission: EventPermission,
        event_id: Uuid,
    },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Event-scoped permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventPermission {
    /// Create, edit, delete and list content pages
    ManagePages,
}

impl EventPermission {
    /// Gets the minimum organizer role required for this permission
    pub fn min_role(&self) -> MembershipRole {
        match self {
            EventPermission::ManagePages => MembershipRole::Admin,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventPermission::ManagePages => "manage_pages",
        }
    }
}

impl fmt::Display for EventPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port answering "may this user do that on this event?"
#[async_trait]
pub trait EventAuthorizer: Send + Sync {
    async fn has_permission(
        &self,
        user_id: Uuid,
        event: &EventRef,
        permission: EventPermission,
    ) -> Result<bool, AuthzError>;
}

/// Fails with `AuthzError::Forbidden` unless the user holds `permission`
pub async fn require_permission(
    authorizer: &dyn EventAuthorizer,
    auth: &AuthContext,
    event: &EventRef,
    permission: EventPermission,
) -> Result<(), AuthzError> {
    if !authorizer.has_permission(auth.user_id, event, permission).await? {
        tracing::debug!(
            user_id = %auth.user_id,
            event_id = %event.id,
            permission = %permission,
            "Permission denied"
        );
        return Err(AuthzError::Forbidden {
            permission,
            event_id: event.id,
        });
    }

    Ok(())
}

/// Authorizer backed by organizer memberships
#[derive(Clone)]
pub struct MembershipAuthorizer {
    pool: PgPool,
}

impl MembershipAuthorizer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventAuthorizer for MembershipAuthorizer {
    async fn has_permission(
        &self,
        user_id: Uuid,
        event: &EventRef,
        permission: EventPermission,
    ) -> Result<bool, AuthzError> {
        let role = Membership::get_role(&self.pool, event.organizer_id, user_id).await?;

        Ok(role.map_or(false, |role| role.has_permission(&permission.min_role())))
    }
}

/// Authorizer with a fixed set of (user, event, permission) grants
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizer {
    grants: HashSet<(Uuid, Uuid, EventPermission)>,
}

impl StaticAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a grant
    pub fn grant(mut self, user_id: Uuid, event_id: Uuid, permission: EventPermission) -> Self {
        self.grants.insert((user_id, event_id, permission));
        self
    }
}

#[async_trait]
impl EventAuthorizer for StaticAuthorizer {
    async fn has_permission(
        &self,
        user_id: Uuid,
        event: &EventRef,
        permission: EventPermission,
    ) -> Result<bool, AuthzError> {
        Ok(self.grants.contains(&(user_id, event.id, permission)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> EventRef {
        EventRef {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            organizer_slug: "acme".to_string(),
            slug: "conf".to_string(),
            name: "Conf".to_string(),
        }
    }

    #[test]
    fn test_manage_pages_requires_admin() {
        assert_eq!(EventPermission::ManagePages.min_role(), MembershipRole::Admin);
        assert_eq!(EventPermission::ManagePages.to_string(), "manage_pages");
    }

    #[tokio::test]
    async fn test_static_authorizer_is_event_scoped() {
        let user = Uuid::new_v4();
        let granted = event();
        let other = event();

        let authorizer = StaticAuthorizer::new().grant(user, granted.id, EventPermission::ManagePages);
        let auth = AuthContext::new(user);

        assert!(require_permission(&authorizer, &auth, &granted, EventPermission::ManagePages)
            .await
            .is_ok());

        let err = require_permission(&authorizer, &auth, &other, EventPermission::ManagePages)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden { event_id, .. } if event_id == other.id));
    }

    #[tokio::test]
    async fn test_static_authorizer_rejects_other_users() {
        let granted = event();
        let authorizer =
            StaticAuthorizer::new().grant(Uuid::new_v4(), granted.id, EventPermission::ManagePages);

        let allowed = authorizer
            .has_permission(Uuid::new_v4(), &granted, EventPermission::ManagePages)
            .await
            .unwrap();
        assert!(!allowed);
    }
}
