//! API request/response models for students.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::students::{Student, StudentCreateDBRequest};
use crate::types::{CrecheId, StudentId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StudentCreate {
    #[schema(value_type = String, format = "uuid")]
    pub creche_id: CrecheId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub parent_name: Option<String>,
    pub parent_phone_number: Option<String>,
    #[serde(default = "default_enrolled")]
    pub enrolled: bool,
}

fn default_enrolled() -> bool {
    true
}

impl From<StudentCreate> for StudentCreateDBRequest {
    fn from(request: StudentCreate) -> Self {
        Self {
            creche_id: request.creche_id,
            first_name: request.first_name,
            last_name: request.last_name,
            date_of_birth: request.date_of_birth,
            parent_name: request.parent_name,
            parent_phone_number: request.parent_phone_number,
            enrolled: request.enrolled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: StudentId,
    #[schema(value_type = String, format = "uuid")]
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

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            creche_id: student.creche_id,
            first_name: student.first_name,
            last_name: student.last_name,
            date_of_birth: student.date_of_birth,
            parent_name: student.parent_name,
            parent_phone_number: student.parent_phone_number,
            enrolled: student.enrolled,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListStudentsQuery {
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
    pub search: Option<String>,
}
