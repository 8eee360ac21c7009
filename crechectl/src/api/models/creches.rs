//! API request/response models for creches.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use utoipa::{IntoParams, ToSchema};

use crate::db::models::creches::{Creche, CrecheCreateDBRequest, CrecheUpdateDBRequest};
use crate::types::CrecheId;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CrecheCreate {
    pub name: String,
    pub province: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price_monthly: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub price_weekly: Option<Decimal>,
    #[serde(default)]
    pub registered: bool,
    /// Feature flags shown on the creche profile, e.g. `{"meals": true}`
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

impl From<CrecheCreate> for CrecheCreateDBRequest {
    fn from(request: CrecheCreate) -> Self {
        Self {
            name: request.name,
            province: request.province,
            address: request.address,
            phone_number: request.phone_number,
            email: request.email,
            capacity: request.capacity,
            price_monthly: request.price_monthly,
            price_weekly: request.price_weekly,
            registered: request.registered,
            features: request.features,
        }
    }
}

/// Creche settings update. Absent fields are left unchanged; an explicit `null` clears a nullable
/// field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CrecheUpdate {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub province: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub capacity: Option<Option<i32>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub price_monthly: Option<Option<Decimal>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub price_weekly: Option<Option<Decimal>>,
    pub registered: Option<bool>,
    pub features: Option<HashMap<String, bool>>,
}

impl From<CrecheUpdate> for CrecheUpdateDBRequest {
    fn from(request: CrecheUpdate) -> Self {
        Self {
            name: request.name,
            province: request.province,
            address: request.address,
            phone_number: request.phone_number,
            email: request.email,
            capacity: request.capacity,
            price_monthly: request.price_monthly,
            price_weekly: request.price_weekly,
            registered: request.registered,
            features: request.features,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CrecheResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CrecheId,
    pub name: String,
    pub province: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price_monthly: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub price_weekly: Option<Decimal>,
    pub registered: bool,
    pub features: HashMap<String, bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Creche> for CrecheResponse {
    fn from(creche: Creche) -> Self {
        Self {
            id: creche.id,
            name: creche.name,
            province: creche.province,
            address: creche.address,
            phone_number: creche.phone_number,
            email: creche.email,
            capacity: creche.capacity,
            price_monthly: creche.price_monthly,
            price_weekly: creche.price_weekly,
            registered: creche.registered,
            features: creche.features,
            created_at: creche.created_at,
            updated_at: creche.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListCrechesQuery {
    pub province: Option<String>,
    /// Case-insensitive substring over name, province, address and contact details
    pub search: Option<String>,
}
