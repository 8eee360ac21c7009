//! API request and response data models.
//!
//! API models are distinct from the row structs in [`crate::db::models`]: statuses arrive here as
//! closed enums and are validated at deserialization, while responses echo whatever string is
//! stored so legacy values stay visible.
//!
//! - [`auth`]: login payloads and session views
//! - [`users`]: dashboard users and the request-scoped [`users::CurrentUser`]
//! - [`creches`], [`students`], [`applications`], [`invoices`], [`support_tickets`], [`events`],
//!   [`notifications`]: pass-through CRUD payloads
//! - [`webhook_configurations`]: inbound integration management, keys and logs
//! - [`analytics`]: query parameters for the aggregate endpoints

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
