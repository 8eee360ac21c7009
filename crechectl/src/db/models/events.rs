//! Database models for calendar events.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{CrecheId, EventId};

#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: EventId,
    pub creche_id: CrecheId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventCreateDBRequest {
    pub creche_id: CrecheId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub creche_id: Option<CrecheId>,
}
