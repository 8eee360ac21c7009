//! Authentication and authorization.
//!
//! Dashboard users sign in with email and password at `/authentication/login`. A signed JWT is
//! stored in an HTTP-only cookie; the [`CurrentUser`](crate::api::models::users::CurrentUser)
//! extractor verifies it on every admin API request.
//!
//! # Modules
//!
//! - [`current_user`]: extractor for the authenticated user in handlers
//! - [`events`]: broadcast of sign-in/sign-out events
//! - [`password`]: Argon2 password hashing and verification
//! - [`permissions`]: role checks and per-creche scoping
//! - [`session`]: JWT session tokens and cookies

pub mod current_user;
pub mod events;
pub mod password;
pub mod permissions;
pub mod session;
