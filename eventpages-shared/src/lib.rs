//! # Eventpages Shared Library
//!
//! This crate contains the domain model, persistence and business logic for
//! event-scoped content pages. The HTTP surface lives in `eventpages-api`.
//!
//! ## Module Organization
//!
//! - `models`: Database models (events, memberships, pages, audit log)
//! - `db`: Connection pool and migrations
//! - `auth`: Bearer token validation and event authorization
//! - `pages`: Page lifecycle (slug validation, forms, stores, service, rendering)
//! - `i18n`: Localized strings and language negotiation
//! - `notification`: User-facing flash notifications

pub mod auth;
pub mod db;
pub mod i18n;
pub mod models;
pub mod notification;
pub mod pages;

/// Current version of the Eventpages shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
