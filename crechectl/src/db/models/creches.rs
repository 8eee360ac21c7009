//! Database models for creches.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::types::CrecheId;

/// A childcare facility; the tenant unit.
#[derive(Debug, Clone, FromRow)]
pub struct Creche {
    pub id: CrecheId,
    pub name: String,
    pub province: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<i32>,
    pub price_monthly: Option<Decimal>,
    pub price_weekly: Option<Decimal>,
    pub registered: bool,
    #[sqlx(json)]
    pub features: HashMap<String, bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database request for creating a creche
#[derive(Debug, Clone, Default)]
pub struct CrecheCreateDBRequest {
    pub name: String,
    pub province: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<i32>,
    pub price_monthly: Option<Decimal>,
    pub price_weekly: Option<Decimal>,
    pub registered: bool,
    pub features: HashMap<String, bool>,
}

/// Database request for updating creche settings. `None` leaves the column unchanged; for the
/// nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct CrecheUpdateDBRequest {
    pub name: Option<String>,
    pub province: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub capacity: Option<Option<i32>>,
    pub price_monthly: Option<Option<Decimal>>,
    pub price_weekly: Option<Option<Decimal>>,
    pub registered: Option<bool>,
    pub features: Option<HashMap<String, bool>>,
}

#[derive(Debug, Clone, Default)]
pub struct CrecheFilter {
    /// Restrict to a single creche (used for creche-manager scoping)
    pub id: Option<CrecheId>,
    pub province: Option<String>,
    pub search: Option<String>,
}

impl CrecheFilter {
    pub fn matches(&self, creche: &Creche) -> bool {
        self.id.is_none_or(|id| creche.id == id)
            && self
                .province
                .as_deref()
                .is_none_or(|p| creche.province.as_deref() == Some(p))
            && super::matches_search(
                self.search.as_deref(),
                [
                    Some(creche.name.as_str()),
                    creche.province.as_deref(),
                    creche.address.as_deref(),
                    creche.email.as_deref(),
                ],
            )
    }
}
