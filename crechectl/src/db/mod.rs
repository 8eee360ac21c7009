//! Data access layer.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (api::handlers, webhooks, analytics)
//! └──────┬──────┘
//!        │ Arc<dyn Store>
//!        ↓
//! ┌─────────────┐
//! │    Store    │  (store::Store trait)
//! └──────┬──────┘
//!        │
//!   ┌────┴─────┐
//!   ↓          ↓
//! Postgres   In-memory
//! ```
//!
//! # Modules
//!
//! - [`store`]: the [`Store`](store::Store) trait every backend implements
//! - [`postgres`]: PostgreSQL backend (sqlx)
//! - [`in_memory`]: concurrent in-memory backend for development and tests
//! - [`models`]: row structs, create/update requests and list filters
//! - [`errors`]: store error type

pub mod errors;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::Store;
