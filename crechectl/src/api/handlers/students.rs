//! HTTP handlers for students.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        students::{ListStudentsQuery, StudentCreate, StudentResponse},
        users::CurrentUser,
    },
    auth::permissions,
    db::models::students::StudentFilter,
    errors::{Error, Result},
};

/// List students
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    params(ListStudentsQuery),
    responses(
        (status = 200, description = "Students by last name", body = [StudentResponse]),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListStudentsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<StudentResponse>>> {
    let filter = StudentFilter {
        creche_id: permissions::scoped_creche_filter(&current_user, query.creche_id)?,
        search: query.search,
    };

    let students = state.store.list_students(&filter).await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

/// Register a student
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    request_body = StudentCreate,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Bad request or unknown creche"),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn create_student(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<StudentCreate>,
) -> Result<(StatusCode, Json<StudentResponse>)> {
    permissions::ensure_creche_access(&current_user, request.creche_id, "create students for")?;

    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "First and last name are required".to_string(),
        });
    }

    let student = state.store.create_student(&request.into()).await?;
    Ok((StatusCode::CREATED, Json(student.into())))
}
