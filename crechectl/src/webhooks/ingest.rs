//! The ingestion pipeline.
//!
//! 1. Resolve the configuration by exact key (exactly one row must match, and it must be enabled).
//! 2. Decode the payload and build the lead.
//! 3. Insert the application. The response depends on this step only.
//! 4. Spawn a detached task that writes the webhook log row and bumps `last_used_at`. Its
//!    failures are logged and swallowed.

use std::sync::Arc;

use axum::http::{HeaderMap, header::USER_AGENT};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::db::models::applications::Application;
use crate::db::models::webhooks::{WebhookConfiguration, WebhookLogCreateDBRequest};
use crate::db::store::Store;
use crate::types::{WebhookLogStatus, abbrev_uuid};

use super::IngestError;
use super::keys::redact_key;
use super::payload::LeadPayload;

/// Requester details recorded on the webhook log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    /// Client IP from the first `x-forwarded-for` entry, else `x-real-ip`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name| headers.get(name).and_then(|v| v.to_str().ok());

        let ip_address = header("x-forwarded-for")
            .and_then(|forwarded| forwarded.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .or_else(|| header("x-real-ip").map(str::trim))
            .map(str::to_string);

        Self {
            ip_address,
            user_agent: headers.get(USER_AGENT).and_then(|v| v.to_str().ok()).map(str::to_string),
        }
    }
}

/// Result of one ingestion request.
pub struct Ingestion {
    pub outcome: Result<Application, IngestError>,
    /// Background log/timestamp writes. `None` when no configuration was resolved. The HTTP
    /// handler drops this (detaching the task); tests await it.
    pub telemetry: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct Ingestor {
    store: Arc<dyn Store>,
    apply_field_mapping: bool,
}

impl Ingestor {
    pub fn new(store: Arc<dyn Store>, apply_field_mapping: bool) -> Self {
        Self {
            store,
            apply_field_mapping,
        }
    }

    #[instrument(skip_all, fields(webhook_key = webhook_key.map(redact_key)))]
    pub async fn ingest(&self, webhook_key: Option<&str>, body: &[u8], meta: RequestMeta) -> Ingestion {
        let Some(webhook_key) = webhook_key.filter(|k| !k.is_empty()) else {
            return self.finish(Err(IngestError::MissingKey), None);
        };

        let configuration = match self.resolve(webhook_key).await {
            Ok(configuration) => configuration,
            Err(e) => return self.finish(Err(e), None),
        };

        let outcome = self.create_lead(&configuration, body).await;
        let log_payload = serde_json::from_slice(body).unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()));
        let telemetry = self.spawn_telemetry(&configuration, log_payload, &outcome, meta);

        self.finish(outcome, Some(telemetry))
    }

    async fn resolve(&self, webhook_key: &str) -> Result<WebhookConfiguration, IngestError> {
        let mut matches = match self.store.find_webhook_configurations_by_key(webhook_key).await {
            Ok(matches) => matches,
            Err(e) => {
                error!("Webhook configuration lookup failed: {e:#}");
                return Err(IngestError::InvalidKey);
            }
        };

        if matches.len() != 1 {
            if matches.len() > 1 {
                error!(count = matches.len(), "webhook key resolves to more than one configuration");
            }
            return Err(IngestError::InvalidKey);
        }
        let configuration = matches.remove(0);

        if !configuration.enabled {
            return Err(IngestError::Disabled);
        }
        Ok(configuration)
    }

    async fn create_lead(&self, configuration: &WebhookConfiguration, body: &[u8]) -> Result<Application, IngestError> {
        let mut payload = LeadPayload::decode(body)?;
        if self.apply_field_mapping && !configuration.field_mapping.is_empty() {
            payload.apply_field_mapping(&configuration.field_mapping);
        }

        let request = payload.into_application(configuration.creche_id);
        self.store
            .create_application(&request)
            .await
            .map_err(IngestError::insert)
    }

    fn spawn_telemetry(
        &self,
        configuration: &WebhookConfiguration,
        payload: serde_json::Value,
        outcome: &Result<Application, IngestError>,
        meta: RequestMeta,
    ) -> JoinHandle<()> {
        let store = self.store.clone();
        let configuration_id = configuration.id;
        let (status, error) = match outcome {
            Ok(_) => (WebhookLogStatus::Success, None),
            Err(e) => (WebhookLogStatus::Error, Some(e.to_string())),
        };
        let succeeded = outcome.is_ok();

        tokio::spawn(async move {
            let log = WebhookLogCreateDBRequest {
                webhook_configuration_id: configuration_id,
                payload,
                status,
                error,
                ip_address: meta.ip_address,
                user_agent: meta.user_agent,
            };
            if let Err(e) = store.create_webhook_log(&log).await {
                warn!(webhook_configuration_id = %abbrev_uuid(&configuration_id), "Failed to write webhook log: {e:#}");
            }

            if succeeded && let Err(e) = store.touch_webhook_configuration(configuration_id).await {
                warn!(webhook_configuration_id = %abbrev_uuid(&configuration_id), "Failed to update webhook last_used_at: {e:#}");
            }
        })
    }

    fn finish(&self, outcome: Result<Application, IngestError>, telemetry: Option<JoinHandle<()>>) -> Ingestion {
        let label = match &outcome {
            Ok(application) => {
                info!(
                    application_id = %abbrev_uuid(&application.id),
                    creche_id = %abbrev_uuid(&application.creche_id),
                    "Webhook lead created"
                );
                "success"
            }
            Err(e) => {
                debug!("Webhook ingestion rejected: {e}");
                e.outcome()
            }
        };
        metrics::counter!("crechectl_webhook_ingestions_total", "outcome" => label).increment(1);

        Ingestion { outcome, telemetry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::db::models::applications::ApplicationFilter;
    use crate::db::models::creches::CrecheCreateDBRequest;
    use crate::db::models::webhooks::{WebhookConfigurationCreateDBRequest, WebhookConfigurationUpdateDBRequest};
    use std::collections::HashMap;

    async fn setup(enabled: bool) -> (Arc<InMemoryStore>, WebhookConfiguration) {
        let store = Arc::new(InMemoryStore::new());
        let creche = store
            .create_creche(&CrecheCreateDBRequest {
                name: "Sunshine".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let configuration = store
            .create_webhook_configuration(&WebhookConfigurationCreateDBRequest {
                creche_id: creche.id,
                name: "Website".to_string(),
                webhook_key: "whk_test".to_string(),
                field_mapping: HashMap::from([("full_name".to_string(), "parent_name".to_string())]),
                enabled,
            })
            .await
            .unwrap();
        (store, configuration)
    }

    fn meta() -> RequestMeta {
        RequestMeta {
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: Some("form-bot/1.0".to_string()),
        }
    }

    #[test]
    fn test_request_meta_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "198.51.100.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        headers.insert(USER_AGENT, "curl/8.0".parse().unwrap());

        let meta = RequestMeta::from_headers(&headers);
        assert_eq!(meta.ip_address.as_deref(), Some("198.51.100.7"));
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8.0"));

        headers.remove("x-forwarded-for");
        assert_eq!(RequestMeta::from_headers(&headers).ip_address.as_deref(), Some("10.0.0.2"));

        assert_eq!(RequestMeta::from_headers(&HeaderMap::new()), RequestMeta::default());
    }

    #[test_log::test(tokio::test)]
    async fn test_successful_ingestion_logs_and_touches() {
        let (store, configuration) = setup(true).await;
        let ingestor = Ingestor::new(store.clone(), false);

        let ingestion = ingestor
            .ingest(Some("whk_test"), br#"{"name":"Thandi","phone":"082"}"#, meta())
            .await;
        let application = ingestion.outcome.unwrap();
        ingestion.telemetry.unwrap().await.unwrap();

        assert_eq!(application.creche_id, configuration.creche_id);
        assert_eq!(application.source, "webhook");
        assert_eq!(application.parent_name, "Thandi");

        let logs = store.list_webhook_logs(configuration.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, "success");
        assert_eq!(logs[0].ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(logs[0].user_agent.as_deref(), Some("form-bot/1.0"));
        assert_eq!(logs[0].payload["name"], "Thandi");

        let refreshed = store.get_webhook_configuration(configuration.id).await.unwrap().unwrap();
        assert!(refreshed.last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_missing_and_unknown_keys() {
        let (store, _) = setup(true).await;
        let ingestor = Ingestor::new(store.clone(), false);

        let missing = ingestor.ingest(None, b"{}", meta()).await;
        assert_eq!(missing.outcome.unwrap_err(), IngestError::MissingKey);
        assert!(missing.telemetry.is_none());

        let empty = ingestor.ingest(Some(""), b"{}", meta()).await;
        assert_eq!(empty.outcome.unwrap_err(), IngestError::MissingKey);

        let unknown = ingestor.ingest(Some("whk_nope"), b"{}", meta()).await;
        assert_eq!(unknown.outcome.unwrap_err(), IngestError::InvalidKey);
        assert!(unknown.telemetry.is_none());

        let all = store.list_applications(&ApplicationFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_configuration_is_refused() {
        let (store, _) = setup(false).await;
        let ingestor = Ingestor::new(store.clone(), false);

        let ingestion = ingestor.ingest(Some("whk_test"), br#"{"name":"A"}"#, meta()).await;
        assert_eq!(ingestion.outcome.unwrap_err(), IngestError::Disabled);
        assert!(store.list_applications(&ApplicationFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_payload_writes_error_log() {
        let (store, configuration) = setup(true).await;
        let ingestor = Ingestor::new(store.clone(), false);

        let ingestion = ingestor.ingest(Some("whk_test"), b"[1, 2, 3]", meta()).await;
        assert_eq!(ingestion.outcome.unwrap_err(), IngestError::NotAnObject);
        ingestion.telemetry.unwrap().await.unwrap();

        let logs = store.list_webhook_logs(configuration.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, "error");
        assert_eq!(logs[0].error.as_deref(), Some("Payload must be a JSON object"));

        // Failed requests don't count as usage
        let refreshed = store.get_webhook_configuration(configuration.id).await.unwrap().unwrap();
        assert!(refreshed.last_used_at.is_none());
    }

    #[tokio::test]
    async fn test_field_mapping_only_when_enabled() {
        let (store, _) = setup(true).await;
        let body = br#"{"full_name":"Sipho"}"#;

        let fixed = Ingestor::new(store.clone(), false)
            .ingest(Some("whk_test"), body, meta())
            .await;
        assert_eq!(fixed.outcome.unwrap().parent_name, "Unknown");

        let mapped = Ingestor::new(store.clone(), true)
            .ingest(Some("whk_test"), body, meta())
            .await;
        assert_eq!(mapped.outcome.unwrap().parent_name, "Sipho");
    }

    #[tokio::test]
    async fn test_rotated_key_stops_resolving() {
        let (store, configuration) = setup(true).await;
        store
            .update_webhook_configuration(
                configuration.id,
                &WebhookConfigurationUpdateDBRequest {
                    webhook_key: Some("whk_rotated".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let ingestor = Ingestor::new(store.clone(), false);

        let old = ingestor.ingest(Some("whk_test"), b"{}", meta()).await;
        assert_eq!(old.outcome.unwrap_err(), IngestError::InvalidKey);
        let new = ingestor.ingest(Some("whk_rotated"), b"{}", meta()).await;
        assert!(new.outcome.is_ok());
    }
}
