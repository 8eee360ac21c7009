//! API request/response models for support tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::support_tickets::SupportTicket;
use crate::types::{CrecheId, SupportTicketId, TicketPriority, TicketStatus, UserId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SupportTicketCreate {
    /// Defaults to the creator's creche for creche managers
    #[schema(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: TicketPriority,
}

fn default_priority() -> TicketPriority {
    TicketPriority::Medium
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SupportTicketUpdate {
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupportTicketResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SupportTicketId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,
    pub subject: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SupportTicket> for SupportTicketResponse {
    fn from(ticket: SupportTicket) -> Self {
        Self {
            id: ticket.id,
            creche_id: ticket.creche_id,
            user_id: ticket.user_id,
            subject: ticket.subject,
            description: ticket.description,
            priority: ticket.priority,
            status: ticket.status,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListSupportTicketsQuery {
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    /// Case-insensitive substring over subject and description
    pub search: Option<String>,
}
