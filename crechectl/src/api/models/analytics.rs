//! Query parameters for the analytics endpoints.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::types::CrecheId;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AnalyticsQuery {
    /// Restrict to one creche (creche managers are always restricted to their own)
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RevenueGrouping {
    Creche,
    #[default]
    Month,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RevenueQuery {
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
    #[serde(default)]
    pub group_by: RevenueGrouping,
}
