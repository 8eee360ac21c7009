//! Inbound webhook lead ingestion.
//!
//! External lead forms post JSON to `{ingest_path}/{webhook_key}`. The key resolves a
//! [`WebhookConfiguration`](crate::db::models::webhooks::WebhookConfiguration), and the payload
//! becomes an application (lead) for that configuration's creche.
//!
//! - [`keys`]: `whk_` key generation
//! - [`payload`]: tolerant payload decoding and optional field mapping
//! - [`ingest`]: the ingestion pipeline and its best-effort request log

pub mod ingest;
pub mod keys;
pub mod payload;

pub use ingest::{Ingestion, Ingestor, RequestMeta};
pub use keys::generate_webhook_key;

use thiserror::Error;
use tracing::error;

use crate::db::errors::DbError;

/// Why an ingestion request was refused. Every variant is rendered as
/// `400 {"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("No webhook key provided")]
    MissingKey,

    #[error("Invalid webhook key")]
    InvalidKey,

    #[error("Webhook is disabled")]
    Disabled,

    #[error("Payload must be a JSON object")]
    NotAnObject,

    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    /// The application insert failed
    #[error("{0}")]
    Insert(String),
}

impl IngestError {
    /// A failed application insert. Constraint failures keep their category; anything else is
    /// logged and reported generically so driver details never reach the public caller.
    pub fn insert(err: DbError) -> Self {
        match err {
            DbError::Other(e) => {
                error!(error = %e, "webhook application insert failed");
                IngestError::Insert("Failed to create application".to_string())
            }
            e => IngestError::Insert(e.to_string()),
        }
    }

    /// Label for the ingestion counter
    pub fn outcome(&self) -> &'static str {
        match self {
            IngestError::MissingKey => "missing_key",
            IngestError::InvalidKey => "invalid_key",
            IngestError::Disabled => "disabled",
            IngestError::NotAnObject | IngestError::InvalidJson(_) => "invalid_payload",
            IngestError::Insert(_) => "insert_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_failures_hide_driver_details() {
        let err = IngestError::insert(DbError::Other(anyhow::anyhow!("connection to 10.0.0.3:5432 refused")));
        assert_eq!(err.to_string(), "Failed to create application");
        assert_eq!(err.outcome(), "insert_failed");

        let err = IngestError::insert(DbError::ForeignKeyViolation {
            constraint: Some("applications_creche_id_fkey".to_string()),
            table: Some("applications".to_string()),
            message: "insert or update violates foreign key".to_string(),
        });
        assert_eq!(err.to_string(), "Foreign key constraint violation");
    }
}
