//! Database models for invoices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::types::{CrecheId, InvoiceId, InvoiceStatus, StudentId};

#[derive(Debug, Clone, FromRow)]
pub struct Invoice {
    pub id: InvoiceId,
    pub creche_id: CrecheId,
    pub student_id: Option<StudentId>,
    pub total_amount: Decimal,
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct InvoiceCreateDBRequest {
    pub creche_id: CrecheId,
    pub student_id: Option<StudentId>,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub issued_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub creche_id: Option<CrecheId>,
    pub status: Option<String>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.creche_id.is_none_or(|id| invoice.creche_id == id) && self.status.as_deref().is_none_or(|s| invoice.status == s)
    }
}
