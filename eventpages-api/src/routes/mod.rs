/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `pages`: Page management (authenticated)
/// - `public`: Rendered pages and page links (public)

pub mod health;
pub mod pages;
pub mod public;
