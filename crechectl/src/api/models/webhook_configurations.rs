//! API request/response models for inbound webhook configurations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::webhooks::{WebhookConfiguration, WebhookLog};
use crate::types::{CrecheId, WebhookConfigurationId, WebhookLogId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookConfigurationCreate {
    #[schema(value_type = String, format = "uuid")]
    pub creche_id: CrecheId,
    pub name: String,
    /// Payload key to lead column, e.g. `{"full_name": "parent_name"}`
    #[serde(default)]
    pub field_mapping: HashMap<String, String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WebhookConfigurationUpdate {
    pub name: Option<String>,
    pub field_mapping: Option<HashMap<String, String>>,
    pub enabled: Option<bool>,
}

/// The key is part of the ingestion URL, so dashboard users see it in full.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookConfigurationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: WebhookConfigurationId,
    #[schema(value_type = String, format = "uuid")]
    pub creche_id: CrecheId,
    pub name: String,
    pub webhook_key: String,
    /// Path to post leads to, `{ingest_path}/{webhook_key}`
    pub ingest_url: String,
    pub field_mapping: HashMap<String, String>,
    pub enabled: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WebhookConfigurationResponse {
    pub fn new(configuration: WebhookConfiguration, ingest_base_path: &str) -> Self {
        Self {
            ingest_url: format!("{ingest_base_path}/{}", configuration.webhook_key),
            id: configuration.id,
            creche_id: configuration.creche_id,
            name: configuration.name,
            webhook_key: configuration.webhook_key,
            field_mapping: configuration.field_mapping,
            enabled: configuration.enabled,
            last_used_at: configuration.last_used_at,
            created_at: configuration.created_at,
            updated_at: configuration.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookLogResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: WebhookLogId,
    #[schema(value_type = String, format = "uuid")]
    pub webhook_configuration_id: WebhookConfigurationId,
    pub payload: serde_json::Value,
    pub status: String,
    pub error: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<WebhookLog> for WebhookLogResponse {
    fn from(log: WebhookLog) -> Self {
        Self {
            id: log.id,
            webhook_configuration_id: log.webhook_configuration_id,
            payload: log.payload,
            status: log.status,
            error: log.error,
            ip_address: log.ip_address,
            user_agent: log.user_agent,
            created_at: log.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListWebhookConfigurationsQuery {
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
}
