//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): login, logout, session view and session events
//! - **Lead ingestion** (`/functions/v1/webhook/{webhook_key}` by default): public, key-authenticated
//! - **Admin API** (`/admin/api/v1/*`): creches, students, applications, invoices, support tickets,
//!   webhook configurations, users, events, notifications and analytics
//!
//! All admin endpoints are documented with `utoipa`; the rendered docs live at `/admin/docs`.

pub mod handlers;
pub mod models;
