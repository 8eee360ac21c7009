//! HTTP handlers for support tickets.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        support_tickets::{ListSupportTicketsQuery, SupportTicketCreate, SupportTicketResponse, SupportTicketUpdate},
        users::CurrentUser,
    },
    auth::permissions,
    db::models::support_tickets::{SupportTicket, SupportTicketCreateDBRequest, SupportTicketFilter, SupportTicketUpdateDBRequest},
    errors::{Error, Result},
    types::{Role, SupportTicketId, TicketStatus},
};

fn not_found(id: SupportTicketId) -> Error {
    Error::NotFound {
        resource: "Support ticket".to_string(),
        id: id.to_string(),
    }
}

/// Managers may touch tickets for their creche or ones they opened themselves
fn ensure_ticket_access(user: &CurrentUser, ticket: &SupportTicket) -> Result<()> {
    if user.role != Role::CrecheManager || ticket.user_id == Some(user.id) {
        return Ok(());
    }
    match ticket.creche_id {
        Some(creche_id) => permissions::ensure_creche_access(user, creche_id, "update tickets for"),
        None => permissions::require_platform_staff(user, "update", "platform support tickets"),
    }
}

/// List support tickets, newest first
#[utoipa::path(
    get,
    path = "/support-tickets",
    tag = "support",
    params(ListSupportTicketsQuery),
    responses(
        (status = 200, description = "Support tickets", body = [SupportTicketResponse]),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_support_tickets(
    State(state): State<AppState>,
    Query(query): Query<ListSupportTicketsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<SupportTicketResponse>>> {
    let filter = SupportTicketFilter {
        creche_id: permissions::scoped_creche_filter(&current_user, query.creche_id)?,
        priority: query.priority.map(|p| p.as_str().to_string()),
        status: query.status.map(|s| s.as_str().to_string()),
        search: query.search,
    };

    let tickets = state.store.list_support_tickets(&filter).await?;
    Ok(Json(tickets.into_iter().map(Into::into).collect()))
}

/// Open a support ticket
#[utoipa::path(
    post,
    path = "/support-tickets",
    tag = "support",
    request_body = SupportTicketCreate,
    responses(
        (status = 201, description = "Ticket opened", body = SupportTicketResponse),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn create_support_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<SupportTicketCreate>,
) -> Result<(StatusCode, Json<SupportTicketResponse>)> {
    if request.subject.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Subject is required".to_string(),
        });
    }

    let creche_id = request.creche_id.or(current_user.creche_id);
    if let Some(creche_id) = creche_id {
        permissions::ensure_creche_access(&current_user, creche_id, "open tickets for")?;
    }

    let db_request = SupportTicketCreateDBRequest {
        creche_id,
        user_id: Some(current_user.id),
        subject: request.subject,
        description: request.description,
        priority: request.priority,
        status: TicketStatus::Open,
    };

    let ticket = state.store.create_support_ticket(&db_request).await?;
    Ok((StatusCode::CREATED, Json(ticket.into())))
}

/// Change a ticket's priority or status
#[utoipa::path(
    patch,
    path = "/support-tickets/{id}",
    tag = "support",
    params(("id" = uuid::Uuid, Path, description = "Support ticket ID")),
    request_body = SupportTicketUpdate,
    responses(
        (status = 200, description = "Ticket updated", body = SupportTicketResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn update_support_ticket(
    State(state): State<AppState>,
    Path(id): Path<SupportTicketId>,
    current_user: CurrentUser,
    Json(request): Json<SupportTicketUpdate>,
) -> Result<Json<SupportTicketResponse>> {
    let existing = state.store.get_support_ticket(id).await?.ok_or_else(|| not_found(id))?;
    ensure_ticket_access(&current_user, &existing)?;

    let db_request = SupportTicketUpdateDBRequest {
        priority: request.priority,
        status: request.status,
    };
    let ticket = state
        .store
        .update_support_ticket(id, &db_request)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(ticket.into()))
}
