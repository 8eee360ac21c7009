//! HTTP handlers for invoices.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        invoices::{InvoiceCreate, InvoiceResponse, ListInvoicesQuery},
        users::CurrentUser,
    },
    auth::permissions,
    db::models::invoices::{InvoiceCreateDBRequest, InvoiceFilter},
    errors::{Error, Result},
};

/// List invoices, most recently issued first
#[utoipa::path(
    get,
    path = "/invoices",
    tag = "invoices",
    params(ListInvoicesQuery),
    responses(
        (status = 200, description = "Invoices", body = [InvoiceResponse]),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<InvoiceResponse>>> {
    let filter = InvoiceFilter {
        creche_id: permissions::scoped_creche_filter(&current_user, query.creche_id)?,
        status: query.status.map(|s| s.as_str().to_string()),
    };

    let invoices = state.store.list_invoices(&filter).await?;
    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}

/// Issue an invoice
#[utoipa::path(
    post,
    path = "/invoices",
    tag = "invoices",
    request_body = InvoiceCreate,
    responses(
        (status = 201, description = "Invoice created", body = InvoiceResponse),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn create_invoice(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<InvoiceCreate>,
) -> Result<(StatusCode, Json<InvoiceResponse>)> {
    permissions::ensure_creche_access(&current_user, request.creche_id, "invoice for")?;

    if request.total_amount < Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "Invoice total cannot be negative".to_string(),
        });
    }

    let db_request = InvoiceCreateDBRequest {
        creche_id: request.creche_id,
        student_id: request.student_id,
        total_amount: request.total_amount,
        status: request.status,
        issued_at: request.issued_at.unwrap_or_else(Utc::now),
        due_at: request.due_at,
    };

    let invoice = state.store.create_invoice(&db_request).await?;
    Ok((StatusCode::CREATED, Json(invoice.into())))
}
