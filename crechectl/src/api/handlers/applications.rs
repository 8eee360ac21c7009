//! HTTP handlers for enrollment applications (leads).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        applications::{ApplicationCreate, ApplicationResponse, ApplicationUpdate, ListApplicationsQuery},
        users::CurrentUser,
    },
    auth::permissions,
    db::models::applications::{ApplicationCreateDBRequest, ApplicationFilter, ApplicationUpdateDBRequest},
    errors::{Error, Result},
    types::ApplicationId,
};

fn not_found(id: ApplicationId) -> Error {
    Error::NotFound {
        resource: "Application".to_string(),
        id: id.to_string(),
    }
}

/// List applications, newest first
#[utoipa::path(
    get,
    path = "/applications",
    tag = "applications",
    params(ListApplicationsQuery),
    responses(
        (status = 200, description = "Applications", body = [ApplicationResponse]),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<ApplicationResponse>>> {
    let filter = ApplicationFilter {
        creche_id: permissions::scoped_creche_filter(&current_user, query.creche_id)?,
        status: query.status.map(|s| s.as_str().to_string()),
        search: query.search,
    };

    let applications = state.store.list_applications(&filter).await?;
    Ok(Json(applications.into_iter().map(Into::into).collect()))
}

/// Record an application from the dashboard or website
#[utoipa::path(
    post,
    path = "/applications",
    tag = "applications",
    request_body = ApplicationCreate,
    responses(
        (status = 201, description = "Application created", body = ApplicationResponse),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn create_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ApplicationCreate>,
) -> Result<(StatusCode, Json<ApplicationResponse>)> {
    permissions::ensure_creche_access(&current_user, request.creche_id, "create applications for")?;

    if request.parent_name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Parent name is required".to_string(),
        });
    }

    let db_request = ApplicationCreateDBRequest {
        creche_id: request.creche_id,
        parent_name: request.parent_name,
        parent_email: request.parent_email,
        parent_phone_number: request.parent_phone_number,
        message: request.message,
        status: request.status,
        source: request.source,
    };

    let application = state.store.create_application(&db_request).await?;
    Ok((StatusCode::CREATED, Json(application.into())))
}

/// Move an application through its lifecycle
#[utoipa::path(
    patch,
    path = "/applications/{id}",
    tag = "applications",
    params(("id" = uuid::Uuid, Path, description = "Application ID")),
    request_body = ApplicationUpdate,
    responses(
        (status = 200, description = "Application updated", body = ApplicationResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
    current_user: CurrentUser,
    Json(request): Json<ApplicationUpdate>,
) -> Result<Json<ApplicationResponse>> {
    let existing = state.store.get_application(id).await?.ok_or_else(|| not_found(id))?;
    permissions::ensure_creche_access(&current_user, existing.creche_id, "update applications for")?;

    let db_request = ApplicationUpdateDBRequest {
        status: request.status,
        message: request.message,
    };
    let application = state
        .store
        .update_application(id, &db_request)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(application.into()))
}
