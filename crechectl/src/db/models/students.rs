//! Database models for students.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::types::{CrecheId, StudentId};

#[derive(Debug, Clone, FromRow)]
pub struct Student {
    pub id: StudentId,
    pub creche_id: CrecheId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub parent_name: Option<String>,
    pub parent_phone_number: Option<String>,
    pub enrolled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StudentCreateDBRequest {
    pub creche_id: CrecheId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub parent_name: Option<String>,
    pub parent_phone_number: Option<String>,
    pub enrolled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub creche_id: Option<CrecheId>,
    pub search: Option<String>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        self.creche_id.is_none_or(|id| student.creche_id == id)
            && super::matches_search(
                self.search.as_deref(),
                [
                    Some(student.first_name.as_str()),
                    Some(student.last_name.as_str()),
                    student.parent_name.as_deref(),
                ],
            )
    }
}
