//! API request/response models for enrollment applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::applications::{Application, SOURCE_WEBSITE};
use crate::types::{ApplicationId, ApplicationStatus, CrecheId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplicationCreate {
    #[schema(value_type = String, format = "uuid")]
    pub creche_id: CrecheId,
    pub parent_name: String,
    pub parent_email: Option<String>,
    pub parent_phone_number: String,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_status")]
    pub status: ApplicationStatus,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_status() -> ApplicationStatus {
    ApplicationStatus::New
}

fn default_source() -> String {
    SOURCE_WEBSITE.to_string()
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ApplicationUpdate {
    pub status: Option<ApplicationStatus>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ApplicationId,
    #[schema(value_type = String, format = "uuid")]
    pub creche_id: CrecheId,
    pub parent_name: String,
    pub parent_email: Option<String>,
    pub parent_phone_number: String,
    pub message: String,
    /// As stored; may fall outside the known vocabulary for legacy rows
    pub status: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(application: Application) -> Self {
        Self {
            id: application.id,
            creche_id: application.creche_id,
            parent_name: application.parent_name,
            parent_email: application.parent_email,
            parent_phone_number: application.parent_phone_number,
            message: application.message,
            status: application.status,
            source: application.source,
            created_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListApplicationsQuery {
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
    pub status: Option<ApplicationStatus>,
    pub search: Option<String>,
}
