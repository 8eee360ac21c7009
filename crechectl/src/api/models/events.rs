//! API request/response models for creche calendar events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::events::{Event, EventCreateDBRequest};
use crate::types::{CrecheId, EventId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EventCreate {
    #[schema(value_type = String, format = "uuid")]
    pub creche_id: CrecheId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl From<EventCreate> for EventCreateDBRequest {
    fn from(request: EventCreate) -> Self {
        Self {
            creche_id: request.creche_id,
            title: request.title,
            description: request.description,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: EventId,
    #[schema(value_type = String, format = "uuid")]
    pub creche_id: CrecheId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            creche_id: event.creche_id,
            title: event.title,
            description: event.description,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListEventsQuery {
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
}
