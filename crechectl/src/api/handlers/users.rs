//! HTTP handlers for dashboard user management. Admin only.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::users::{CurrentUser, ListUsersQuery, UserCreate, UserResponse, UserUpdate},
    auth::{password, permissions},
    db::models::users::{UserCreateDBRequest, UserFilter, UserUpdateDBRequest},
    errors::{Error, Result},
    types::{Role, UserId},
};

async fn hash(state: &AppState, password: Option<String>) -> Result<Option<String>> {
    match password {
        Some(password) if password.len() < 8 => Err(Error::BadRequest {
            message: "Password must be at least 8 characters".to_string(),
        }),
        Some(password) => Ok(Some(
            password::hash_password_blocking(password, state.config.auth.password.argon2_params()).await?,
        )),
        None => Ok(None),
    }
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users by email", body = [UserResponse]),
        (status = 403, description = "Admin only"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>> {
    permissions::require_admin(&current_user, "list", "users")?;

    let users = state.store.list_users(&UserFilter { search: query.search }).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Email already registered"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    permissions::require_admin(&current_user, "create", "users")?;

    if !request.email.contains('@') {
        return Err(Error::BadRequest {
            message: "A valid email address is required".to_string(),
        });
    }
    let creche_id = match request.role {
        Role::CrecheManager => Some(request.creche_id.ok_or_else(|| Error::BadRequest {
            message: "Creche managers must be assigned a creche".to_string(),
        })?),
        Role::Admin | Role::Staff => None,
    };

    let db_request = UserCreateDBRequest {
        email: request.email.trim().to_string(),
        display_name: request.display_name,
        password_hash: hash(&state, request.password).await?,
        role: request.role,
        creche_id,
    };

    let user = state.store.create_user(&db_request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Update a user's name, password or role
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not found"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    current_user: CurrentUser,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    permissions::require_admin(&current_user, "update", "users")?;

    if id == current_user.id && request.role.is_some_and(|r| r != Role::Admin) {
        return Err(Error::BadRequest {
            message: "Admins cannot remove their own admin role".to_string(),
        });
    }

    let db_request = UserUpdateDBRequest {
        display_name: request.display_name,
        password_hash: hash(&state, request.password).await?,
        role: request.role,
    };
    let user = state.store.update_user(id, &db_request).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use crate::{api::models::users::UserResponse, test_utils::*, types::Role};
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_only_admins_manage_users() {
        let app = create_test_app();
        let staff = create_test_user(&app.store, Role::Staff, None).await;
        let (name, value) = app.auth_header(&staff);

        app.server
            .get("/admin/api/v1/users")
            .add_header(name.clone(), value.clone())
            .await
            .assert_status_forbidden();
        app.server
            .post("/admin/api/v1/users")
            .add_header(name, value)
            .json(&json!({"email": "x@example.org", "role": "staff"}))
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_admin_creates_manager_and_duplicates_conflict() {
        let app = create_test_app();
        let creche = create_test_creche(&app.store, "Bright Stars", None).await;
        let admin = create_test_user(&app.store, Role::Admin, None).await;
        let (name, value) = app.auth_header(&admin);

        // A manager without a creche is refused
        app.server
            .post("/admin/api/v1/users")
            .add_header(name.clone(), value.clone())
            .json(&json!({"email": "mgr@example.org", "role": "creche_manager"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = app
            .server
            .post("/admin/api/v1/users")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "email": "mgr@example.org",
                "role": "creche_manager",
                "creche_id": creche.id,
                "password": "long enough"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: UserResponse = response.json();
        assert_eq!(created.role, "creche_manager");
        assert_eq!(created.creche_id, Some(creche.id));

        app.server
            .post("/admin/api/v1/users")
            .add_header(name.clone(), value.clone())
            .json(&json!({"email": "MGR@example.org", "role": "staff"}))
            .await
            .assert_status(StatusCode::CONFLICT);

        let listed: Vec<UserResponse> = app
            .server
            .get("/admin/api/v1/users?search=mgr")
            .add_header(name, value)
            .await
            .json();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_self() {
        let app = create_test_app();
        let admin = create_test_user(&app.store, Role::Admin, None).await;
        let (name, value) = app.auth_header(&admin);

        app.server
            .patch(&format!("/admin/api/v1/users/{}", admin.id))
            .add_header(name, value)
            .json(&json!({"role": "staff"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
