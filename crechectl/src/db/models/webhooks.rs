//! Database models for inbound webhook configurations and their request logs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{CrecheId, WebhookConfigurationId, WebhookLogId, WebhookLogStatus};

/// An inbound integration: a secret key bound to one creche.
#[derive(Debug, Clone, FromRow)]
pub struct WebhookConfiguration {
    pub id: WebhookConfigurationId,
    pub creche_id: CrecheId,
    pub name: String,
    pub webhook_key: String,
    /// Payload key to application column
    #[sqlx(json)]
    pub field_mapping: HashMap<String, String>,
    pub enabled: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WebhookConfigurationCreateDBRequest {
    pub creche_id: CrecheId,
    pub name: String,
    pub webhook_key: String,
    pub field_mapping: HashMap<String, String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WebhookConfigurationUpdateDBRequest {
    pub name: Option<String>,
    pub field_mapping: Option<HashMap<String, String>>,
    pub enabled: Option<bool>,
    /// Replacement key when rotating
    pub webhook_key: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WebhookConfigurationFilter {
    pub creche_id: Option<CrecheId>,
}

/// One row per received webhook request that resolved to a configuration.
#[derive(Debug, Clone, FromRow)]
pub struct WebhookLog {
    pub id: WebhookLogId,
    pub webhook_configuration_id: WebhookConfigurationId,
    pub payload: serde_json::Value,
    pub status: String,
    pub error: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WebhookLogCreateDBRequest {
    pub webhook_configuration_id: WebhookConfigurationId,
    pub payload: serde_json::Value,
    pub status: WebhookLogStatus,
    pub error: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
