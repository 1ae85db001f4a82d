/// Database models for Eventpages
///
/// # Models
///
/// - `event`: Organizers and events (host-owned, read here)
/// - `membership`: Organizer roles used for authorization
/// - `page`: Event content pages
/// - `audit_log`: Append-only action log

pub mod audit_log;
pub mod event;
pub mod membership;
pub mod page;
