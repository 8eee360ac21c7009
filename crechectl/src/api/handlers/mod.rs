//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates and deserializes the request, checks the caller's role and creche scope
//! through [`crate::auth::permissions`], calls the [`crate::db::Store`], and serializes the result.
//!
//! - [`auth`]: login, logout, current session and the session event stream
//! - [`webhook_ingest`]: the public lead ingestion endpoint
//! - [`analytics`]: dashboard aggregates
//! - the remaining modules are pass-through CRUD per table
//!
//! Handlers return [`crate::errors::Error`], which converts to the appropriate status code.
//! The ingestion endpoint is the exception: it always answers `{"error": ...}` with 400.

pub mod analytics;
pub mod applications;
pub mod auth;
pub mod creches;
pub mod events;
pub mod invoices;
pub mod notifications;
pub mod students;
pub mod support_tickets;
pub mod users;
pub mod webhook_configurations;
pub mod webhook_ingest;
