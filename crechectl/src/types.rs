//! Common type definitions and the closed status vocabularies.
//!
//! This module defines:
//! - Type aliases for entity IDs (CrecheId, UserId, etc.)
//! - Closed enumerations for the string statuses stored in the database
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases for better type safety:
//!
//! - [`CrecheId`]: Childcare facility identifier (the tenant unit)
//! - [`UserId`]: Dashboard user identifier
//! - [`ApplicationId`]: Enrollment lead identifier
//! - [`WebhookConfigurationId`]: Inbound integration identifier
//!
//! # Status vocabularies
//!
//! Statuses are persisted as strings. Converting them into the closed enums below is exact and
//! case-sensitive; anything outside the vocabulary is an [`UnknownVariant`] error so callers can
//! surface it instead of silently excluding the row.
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

// Type aliases for IDs
pub type CrecheId = Uuid;
pub type StudentId = Uuid;
pub type ApplicationId = Uuid;
pub type InvoiceId = Uuid;
pub type SupportTicketId = Uuid;
pub type WebhookConfigurationId = Uuid;
pub type WebhookLogId = Uuid;
pub type UserId = Uuid;
pub type EventId = Uuid;
pub type NotificationId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// A stored string that is not part of a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `FromStr`, `Display` and serde for a closed string vocabulary.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Lifecycle of an enrollment lead.
///
/// The external vocabulary is capitalised (`"New"`), and the pending-applications metric counts
/// only `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
pub enum ApplicationStatus {
    New,
    Contacted,
    Accepted,
    Enrolled,
    Rejected,
    Withdrawn,
}

string_enum!(ApplicationStatus, "application status", {
    New => "New",
    Contacted => "Contacted",
    Accepted => "Accepted",
    Enrolled => "Enrolled",
    Rejected => "Rejected",
    Withdrawn => "Withdrawn",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[schema(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

string_enum!(TicketPriority, "ticket priority", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[schema(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

string_enum!(TicketStatus, "ticket status", {
    Open => "open",
    InProgress => "in_progress",
    Resolved => "resolved",
    Closed => "closed",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[schema(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

string_enum!(InvoiceStatus, "invoice status", {
    Draft => "draft",
    Sent => "sent",
    Paid => "paid",
    Overdue => "overdue",
    Cancelled => "cancelled",
});

/// Dashboard roles.
///
/// - `Admin`: full access including user management
/// - `Staff`: platform staff, every creche, no user management
/// - `CrecheManager`: scoped to the user's own creche
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[schema(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    CrecheManager,
}

string_enum!(Role, "role", {
    Admin => "admin",
    Staff => "staff",
    CrecheManager => "creche_manager",
});

/// Outcome recorded on a webhook log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[schema(rename_all = "snake_case")]
pub enum WebhookLogStatus {
    Success,
    Error,
}

string_enum!(WebhookLogStatus, "webhook log status", {
    Success => "success",
    Error => "error",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_status_is_case_sensitive() {
        assert_eq!("New".parse::<ApplicationStatus>(), Ok(ApplicationStatus::New));

        let err = "new".parse::<ApplicationStatus>().unwrap_err();
        assert_eq!(err.value, "new");
        assert_eq!(err.to_string(), "Unknown application status 'new'");
    }

    #[test]
    fn test_round_trip_every_variant() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), *status);
        }
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), *role);
        }
    }

    #[test]
    fn test_serde_uses_external_strings() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let priority: TicketPriority = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(priority, TicketPriority::High);

        assert!(serde_json::from_str::<TicketPriority>("\"HIGH\"").is_err());
    }

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }
}
