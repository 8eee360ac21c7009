//! API request/response models for users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::users::User;
use crate::types::{CrecheId, Role, UserId};

/// The signed-in user, resolved from the session cookie for each request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
    pub display_name: Option<String>,
}

impl TryFrom<User> for CurrentUser {
    type Error = crate::types::UnknownVariant;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            role: user.parsed_role()?,
            id: user.id,
            email: user.email,
            creche_id: user.creche_id,
            display_name: user.display_name,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserCreate {
    pub email: String,
    pub display_name: Option<String>,
    /// Optional; users without a password cannot sign in
    pub password: Option<String>,
    pub role: Role,
    /// Required for creche managers, ignored for other roles
    #[schema(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub creche_id: Option<CrecheId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            creche_id: user.creche_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListUsersQuery {
    /// Case-insensitive substring over email and display name
    pub search: Option<String>,
}
