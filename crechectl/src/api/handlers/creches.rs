//! HTTP handlers for creche profiles and settings.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        creches::{CrecheCreate, CrecheResponse, CrecheUpdate, ListCrechesQuery},
        users::CurrentUser,
    },
    auth::permissions,
    db::models::creches::CrecheFilter,
    errors::{Error, Result},
    types::CrecheId,
};

fn not_found(id: CrecheId) -> Error {
    Error::NotFound {
        resource: "Creche".to_string(),
        id: id.to_string(),
    }
}

/// List creches
#[utoipa::path(
    get,
    path = "/creches",
    tag = "creches",
    params(ListCrechesQuery),
    responses(
        (status = 200, description = "Creches visible to the caller, by name", body = [CrecheResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_creches(
    State(state): State<AppState>,
    Query(query): Query<ListCrechesQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<CrecheResponse>>> {
    let filter = CrecheFilter {
        id: permissions::scoped_creche_filter(&current_user, None)?,
        province: query.province,
        search: query.search,
    };

    let creches = state.store.list_creches(&filter).await?;
    Ok(Json(creches.into_iter().map(Into::into).collect()))
}

/// Create a creche
#[utoipa::path(
    post,
    path = "/creches",
    tag = "creches",
    request_body = CrecheCreate,
    responses(
        (status = 201, description = "Creche created", body = CrecheResponse),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn create_creche(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CrecheCreate>,
) -> Result<(StatusCode, Json<CrecheResponse>)> {
    permissions::require_platform_staff(&current_user, "create", "creches")?;

    if request.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Creche name is required".to_string(),
        });
    }
    if request.capacity.is_some_and(|c| c < 0) {
        return Err(Error::BadRequest {
            message: "Capacity cannot be negative".to_string(),
        });
    }

    let creche = state.store.create_creche(&request.into()).await?;
    Ok((StatusCode::CREATED, Json(creche.into())))
}

/// Get a creche
#[utoipa::path(
    get,
    path = "/creches/{id}",
    tag = "creches",
    params(("id" = uuid::Uuid, Path, description = "Creche ID")),
    responses(
        (status = 200, description = "Creche", body = CrecheResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn get_creche(
    State(state): State<AppState>,
    Path(id): Path<CrecheId>,
    current_user: CurrentUser,
) -> Result<Json<CrecheResponse>> {
    permissions::ensure_creche_access(&current_user, id, "read")?;

    let creche = state.store.get_creche(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(creche.into()))
}

/// Update creche settings (capacity, pricing, registration, contact details, features)
#[utoipa::path(
    patch,
    path = "/creches/{id}",
    tag = "creches",
    params(("id" = uuid::Uuid, Path, description = "Creche ID")),
    request_body = CrecheUpdate,
    responses(
        (status = 200, description = "Creche updated", body = CrecheResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn update_creche(
    State(state): State<AppState>,
    Path(id): Path<CrecheId>,
    current_user: CurrentUser,
    Json(request): Json<CrecheUpdate>,
) -> Result<Json<CrecheResponse>> {
    permissions::ensure_creche_access(&current_user, id, "update")?;

    if request.capacity.flatten().is_some_and(|c| c < 0) {
        return Err(Error::BadRequest {
            message: "Capacity cannot be negative".to_string(),
        });
    }

    let creche = state.store.update_creche(id, &request.into()).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(creche.into()))
}

#[cfg(test)]
mod tests {
    use crate::{api::models::creches::CrecheResponse, test_utils::*, types::Role};
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_list_requires_session() {
        let app = create_test_app();
        app.server.get("/admin/api/v1/creches").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_staff_creates_and_searches() {
        let app = create_test_app();
        let staff = create_test_user(&app.store, Role::Staff, None).await;
        let (name, value) = app.auth_header(&staff);

        let response = app
            .server
            .post("/admin/api/v1/creches")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "name": "Sunbeam Daycare",
                "province": "Western Cape",
                "capacity": 40,
                "price_monthly": "2500.00",
                "features": {"meals": true, "transport": false}
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: CrecheResponse = response.json();
        assert_eq!(created.capacity, Some(40));
        assert_eq!(created.features.get("meals"), Some(&true));

        create_test_creche(&app.store, "Other Place", Some("Limpopo")).await;

        let found: Vec<CrecheResponse> = app
            .server
            .get("/admin/api/v1/creches?search=SUNBEAM")
            .add_header(name, value)
            .await
            .json();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);
    }

    #[tokio::test]
    async fn test_manager_is_scoped_to_own_creche() {
        let app = create_test_app();
        let own = create_test_creche(&app.store, "Own", Some("Gauteng")).await;
        let other = create_test_creche(&app.store, "Other", Some("Gauteng")).await;
        let manager = create_test_user(&app.store, Role::CrecheManager, Some(own.id)).await;
        let (name, value) = app.auth_header(&manager);

        let listed: Vec<CrecheResponse> = app
            .server
            .get("/admin/api/v1/creches")
            .add_header(name.clone(), value.clone())
            .await
            .json();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, own.id);

        app.server
            .get(&format!("/admin/api/v1/creches/{}", other.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status_forbidden();

        app.server
            .post("/admin/api/v1/creches")
            .add_header(name.clone(), value.clone())
            .json(&json!({"name": "Sneaky"}))
            .await
            .assert_status_forbidden();

        let updated: CrecheResponse = app
            .server
            .patch(&format!("/admin/api/v1/creches/{}", own.id))
            .add_header(name, value)
            .json(&json!({"capacity": 12, "registered": true}))
            .await
            .json();
        assert_eq!(updated.capacity, Some(12));
        assert!(updated.registered);
    }

    #[tokio::test]
    async fn test_update_can_clear_nullable_settings() {
        let app = create_test_app();
        let creche = create_test_creche(&app.store, "Rainbow Kids", Some("Limpopo")).await;
        let staff = create_test_user(&app.store, Role::Staff, None).await;
        let (name, value) = app.auth_header(&staff);
        let path = format!("/admin/api/v1/creches/{}", creche.id);

        let response = app
            .server
            .patch(&path)
            .add_header(name.clone(), value.clone())
            .json(&json!({"capacity": null, "province": null, "price_monthly": "1200.00"}))
            .await;
        response.assert_status_ok();
        let body: CrecheResponse = response.json();
        assert_eq!(body.capacity, None);
        assert_eq!(body.province, None);
        assert_eq!(body.name, "Rainbow Kids");

        // Absent fields stay as they are
        let response = app
            .server
            .patch(&path)
            .add_header(name, value)
            .json(&json!({"name": "Rainbow Kids ECD"}))
            .await;
        response.assert_status_ok();
        let body: CrecheResponse = response.json();
        assert_eq!(body.name, "Rainbow Kids ECD");
        assert!(body.price_monthly.is_some());
        assert_eq!(body.capacity, None);
    }

    #[tokio::test]
    async fn test_get_missing_creche() {
        let app = create_test_app();
        let admin = create_test_user(&app.store, Role::Admin, None).await;
        let (name, value) = app.auth_header(&admin);

        app.server
            .get(&format!("/admin/api/v1/creches/{}", uuid::Uuid::new_v4()))
            .add_header(name, value)
            .await
            .assert_status_not_found();
    }
}
