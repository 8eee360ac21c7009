//! API request/response models for invoices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::invoices::Invoice;
use crate::types::{CrecheId, InvoiceId, InvoiceStatus, StudentId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InvoiceCreate {
    #[schema(value_type = String, format = "uuid")]
    pub creche_id: CrecheId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<StudentId>,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    #[serde(default = "default_status")]
    pub status: InvoiceStatus,
    /// Defaults to now
    pub issued_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
}

fn default_status() -> InvoiceStatus {
    InvoiceStatus::Draft
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: InvoiceId,
    #[schema(value_type = String, format = "uuid")]
    pub creche_id: CrecheId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<StudentId>,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            creche_id: invoice.creche_id,
            student_id: invoice.student_id,
            total_amount: invoice.total_amount,
            status: invoice.status,
            issued_at: invoice.issued_at,
            due_at: invoice.due_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListInvoicesQuery {
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
    pub status: Option<InvoiceStatus>,
}
