//! Database models for support tickets.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{CrecheId, SupportTicketId, TicketPriority, TicketStatus, UserId};

#[derive(Debug, Clone, FromRow)]
pub struct SupportTicket {
    pub id: SupportTicketId,
    pub creche_id: Option<CrecheId>,
    pub user_id: Option<UserId>,
    pub subject: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SupportTicketCreateDBRequest {
    pub creche_id: Option<CrecheId>,
    pub user_id: Option<UserId>,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Default)]
pub struct SupportTicketUpdateDBRequest {
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct SupportTicketFilter {
    pub creche_id: Option<CrecheId>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl SupportTicketFilter {
    pub fn matches(&self, ticket: &SupportTicket) -> bool {
        self.creche_id.is_none_or(|id| ticket.creche_id == Some(id))
            && self.priority.as_deref().is_none_or(|p| ticket.priority == p)
            && self.status.as_deref().is_none_or(|s| ticket.status == s)
            && super::matches_search(
                self.search.as_deref(),
                [Some(ticket.subject.as_str()), Some(ticket.description.as_str())],
            )
    }
}
