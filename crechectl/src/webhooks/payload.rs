//! Tolerant decoding of inbound lead payloads.
//!
//! Lead forms post free-form JSON. The body must be a JSON object; beyond that nothing is required.
//! The conventional keys `name`, `email`, `phone` and `message` are read when they hold strings
//! and ignored otherwise. Every other key is kept untouched for the webhook log.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::db::models::applications::{ApplicationCreateDBRequest, SOURCE_WEBHOOK};
use crate::types::{ApplicationStatus, CrecheId};

use super::IngestError;

/// Placeholder for a lead's name or phone number when the payload doesn't supply one
pub const UNKNOWN: &str = "Unknown";

/// A decoded lead payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    /// The full original object
    pub raw: Map<String, Value>,
}

impl LeadPayload {
    /// Decode a request body.
    pub fn decode(body: &[u8]) -> Result<Self, IngestError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| IngestError::InvalidJson(e.to_string()))?;
        let Value::Object(raw) = value else {
            return Err(IngestError::NotAnObject);
        };

        Ok(Self {
            name: string_field(&raw, "name"),
            email: string_field(&raw, "email"),
            phone: string_field(&raw, "phone"),
            message: string_field(&raw, "message"),
            raw,
        })
    }

    /// Overlay a configuration's field mapping (payload key to application column).
    ///
    /// Only string values are copied. Targets other than the four lead columns are skipped.
    pub fn apply_field_mapping(&mut self, mapping: &HashMap<String, String>) {
        for (source_key, column) in mapping {
            let Some(value) = string_field(&self.raw, source_key) else {
                continue;
            };
            match column.as_str() {
                "parent_name" => self.name = Some(value),
                "parent_email" => self.email = Some(value),
                "parent_phone_number" => self.phone = Some(value),
                "message" => self.message = Some(value),
                other => tracing::debug!(column = other, "ignoring field mapping to unknown column"),
            }
        }
    }

    /// Build the application row for `creche_id`, filling the defaults.
    pub fn into_application(self, creche_id: CrecheId) -> ApplicationCreateDBRequest {
        ApplicationCreateDBRequest {
            creche_id,
            parent_name: self.name.unwrap_or_else(|| UNKNOWN.to_string()),
            parent_email: self.email,
            parent_phone_number: self.phone.unwrap_or_else(|| UNKNOWN.to_string()),
            message: self.message.unwrap_or_default(),
            status: ApplicationStatus::New,
            source: SOURCE_WEBHOOK.to_string(),
        }
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_decode_known_fields() {
        let payload = LeadPayload::decode(
            br#"{"name":"Thandi","email":"t@example.org","phone":"082","message":"Hi","utm":"ads"}"#,
        )
        .unwrap();

        assert_eq!(payload.name.as_deref(), Some("Thandi"));
        assert_eq!(payload.email.as_deref(), Some("t@example.org"));
        assert_eq!(payload.phone.as_deref(), Some("082"));
        assert_eq!(payload.message.as_deref(), Some("Hi"));
        assert_eq!(payload.raw["utm"], "ads");
    }

    #[test]
    fn test_non_string_fields_are_ignored() {
        let payload = LeadPayload::decode(br#"{"name": 42, "phone": null, "email": ["a"]}"#).unwrap();
        assert_eq!(payload.name, None);
        assert_eq!(payload.phone, None);
        assert_eq!(payload.email, None);
    }

    #[test]
    fn test_non_object_payloads_are_rejected() {
        for body in [&b"[1,2]"[..], &b"\"text\""[..], &b"12"[..], &b"null"[..]] {
            assert_eq!(LeadPayload::decode(body), Err(IngestError::NotAnObject));
        }
    }

    #[test]
    fn test_unparsable_payload() {
        let err = LeadPayload::decode(b"{not json").unwrap_err();
        assert!(matches!(err, IngestError::InvalidJson(_)));
        assert!(err.to_string().starts_with("Invalid JSON payload: "));
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let creche_id = Uuid::new_v4();
        let lead = LeadPayload::decode(b"{}").unwrap().into_application(creche_id);

        assert_eq!(lead.creche_id, creche_id);
        assert_eq!(lead.parent_name, "Unknown");
        assert_eq!(lead.parent_phone_number, "Unknown");
        assert_eq!(lead.parent_email, None);
        assert_eq!(lead.message, "");
        assert_eq!(lead.status, ApplicationStatus::New);
        assert_eq!(lead.source, "webhook");
    }

    #[test]
    fn test_field_mapping_overrides_fixed_keys() {
        let mut payload =
            LeadPayload::decode(br#"{"full_name":"Sipho","name":"ignored","cell":"083","count":3}"#).unwrap();
        let mapping = HashMap::from([
            ("full_name".to_string(), "parent_name".to_string()),
            ("cell".to_string(), "parent_phone_number".to_string()),
            ("count".to_string(), "message".to_string()),
            ("name".to_string(), "not_a_column".to_string()),
        ]);
        payload.apply_field_mapping(&mapping);

        let lead = payload.into_application(Uuid::new_v4());
        assert_eq!(lead.parent_name, "Sipho");
        assert_eq!(lead.parent_phone_number, "083");
        // Non-string source value is skipped
        assert_eq!(lead.message, "");
    }
}
