//! Database models for enrollment applications (leads).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{ApplicationId, ApplicationStatus, CrecheId};

/// Source recorded on leads created by the webhook ingestion endpoint.
pub const SOURCE_WEBHOOK: &str = "webhook";

/// Source recorded on leads created through the admin API when none is given.
pub const SOURCE_WEBSITE: &str = "website";

#[derive(Debug, Clone, FromRow)]
pub struct Application {
    pub id: ApplicationId,
    pub creche_id: CrecheId,
    pub parent_name: String,
    pub parent_email: Option<String>,
    pub parent_phone_number: String,
    pub message: String,
    /// Raw stored status; parse with [`Application::parsed_status`]
    pub status: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn parsed_status(&self) -> Result<ApplicationStatus, crate::types::UnknownVariant> {
        self.status.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationCreateDBRequest {
    pub creche_id: CrecheId,
    pub parent_name: String,
    pub parent_email: Option<String>,
    pub parent_phone_number: String,
    pub message: String,
    pub status: ApplicationStatus,
    pub source: String,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationUpdateDBRequest {
    pub status: Option<ApplicationStatus>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub creche_id: Option<CrecheId>,
    /// Exact match against the stored string
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        self.creche_id.is_none_or(|id| application.creche_id == id)
            && self.status.as_deref().is_none_or(|s| application.status == s)
            && super::matches_search(
                self.search.as_deref(),
                [
                    Some(application.parent_name.as_str()),
                    application.parent_email.as_deref(),
                    Some(application.parent_phone_number.as_str()),
                    Some(application.message.as_str()),
                ],
            )
    }
}
