//! HTTP handlers for managing inbound webhook configurations and reading their logs.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::{info, instrument};

use crate::{
    AppState,
    api::models::{
        users::CurrentUser,
        webhook_configurations::{
            ListWebhookConfigurationsQuery, WebhookConfigurationCreate, WebhookConfigurationResponse, WebhookConfigurationUpdate,
            WebhookLogResponse,
        },
    },
    auth::permissions,
    db::models::webhooks::{
        WebhookConfiguration, WebhookConfigurationCreateDBRequest, WebhookConfigurationFilter, WebhookConfigurationUpdateDBRequest,
    },
    errors::{Error, Result},
    types::{WebhookConfigurationId, abbrev_uuid},
    webhooks::generate_webhook_key,
};

fn not_found(id: WebhookConfigurationId) -> Error {
    Error::NotFound {
        resource: "Webhook configuration".to_string(),
        id: id.to_string(),
    }
}

/// Load a configuration and check the caller can see its creche
async fn load_scoped(state: &AppState, id: WebhookConfigurationId, user: &CurrentUser, action: &'static str) -> Result<WebhookConfiguration> {
    let configuration = state.store.get_webhook_configuration(id).await?.ok_or_else(|| not_found(id))?;
    permissions::ensure_creche_access(user, configuration.creche_id, action)?;
    Ok(configuration)
}

fn respond(state: &AppState, configuration: WebhookConfiguration) -> WebhookConfigurationResponse {
    WebhookConfigurationResponse::new(configuration, state.config.ingest_base_path())
}

/// List webhook configurations
#[utoipa::path(
    get,
    path = "/webhook-configurations",
    tag = "webhook configurations",
    params(ListWebhookConfigurationsQuery),
    responses(
        (status = 200, description = "Webhook configurations", body = [WebhookConfigurationResponse]),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_webhook_configurations(
    State(state): State<AppState>,
    Query(query): Query<ListWebhookConfigurationsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<WebhookConfigurationResponse>>> {
    let filter = WebhookConfigurationFilter {
        creche_id: permissions::scoped_creche_filter(&current_user, query.creche_id)?,
    };

    let configurations = state.store.list_webhook_configurations(&filter).await?;
    Ok(Json(configurations.into_iter().map(|c| respond(&state, c)).collect()))
}

/// Create a webhook configuration with a freshly generated key
#[utoipa::path(
    post,
    path = "/webhook-configurations",
    tag = "webhook configurations",
    request_body = WebhookConfigurationCreate,
    responses(
        (status = 201, description = "Configuration created", body = WebhookConfigurationResponse),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn create_webhook_configuration(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<WebhookConfigurationCreate>,
) -> Result<(StatusCode, Json<WebhookConfigurationResponse>)> {
    permissions::ensure_creche_access(&current_user, request.creche_id, "create webhooks for")?;

    if request.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Webhook name is required".to_string(),
        });
    }

    let db_request = WebhookConfigurationCreateDBRequest {
        creche_id: request.creche_id,
        name: request.name,
        webhook_key: generate_webhook_key(),
        field_mapping: request.field_mapping,
        enabled: request.enabled,
    };

    let configuration = state.store.create_webhook_configuration(&db_request).await?;
    info!(webhook_configuration_id = %abbrev_uuid(&configuration.id), "webhook configuration created");

    Ok((StatusCode::CREATED, Json(respond(&state, configuration))))
}

/// Rename, enable/disable or change the field mapping
#[utoipa::path(
    patch,
    path = "/webhook-configurations/{id}",
    tag = "webhook configurations",
    params(("id" = uuid::Uuid, Path, description = "Webhook configuration ID")),
    request_body = WebhookConfigurationUpdate,
    responses(
        (status = 200, description = "Configuration updated", body = WebhookConfigurationResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn update_webhook_configuration(
    State(state): State<AppState>,
    Path(id): Path<WebhookConfigurationId>,
    current_user: CurrentUser,
    Json(request): Json<WebhookConfigurationUpdate>,
) -> Result<Json<WebhookConfigurationResponse>> {
    load_scoped(&state, id, &current_user, "update webhooks for").await?;

    let db_request = WebhookConfigurationUpdateDBRequest {
        name: request.name,
        field_mapping: request.field_mapping,
        enabled: request.enabled,
        webhook_key: None,
    };
    let configuration = state
        .store
        .update_webhook_configuration(id, &db_request)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(respond(&state, configuration)))
}

/// Replace the key. The old ingestion URL stops working immediately.
#[utoipa::path(
    post,
    path = "/webhook-configurations/{id}/rotate-key",
    tag = "webhook configurations",
    params(("id" = uuid::Uuid, Path, description = "Webhook configuration ID")),
    responses(
        (status = 200, description = "Key rotated", body = WebhookConfigurationResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn rotate_webhook_key(
    State(state): State<AppState>,
    Path(id): Path<WebhookConfigurationId>,
    current_user: CurrentUser,
) -> Result<Json<WebhookConfigurationResponse>> {
    load_scoped(&state, id, &current_user, "rotate webhook keys for").await?;

    let db_request = WebhookConfigurationUpdateDBRequest {
        webhook_key: Some(generate_webhook_key()),
        ..Default::default()
    };
    let configuration = state
        .store
        .update_webhook_configuration(id, &db_request)
        .await?
        .ok_or_else(|| not_found(id))?;
    info!(webhook_configuration_id = %abbrev_uuid(&id), "webhook key rotated");

    Ok(Json(respond(&state, configuration)))
}

/// Delete a configuration and its logs
#[utoipa::path(
    delete,
    path = "/webhook-configurations/{id}",
    tag = "webhook configurations",
    params(("id" = uuid::Uuid, Path, description = "Webhook configuration ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn delete_webhook_configuration(
    State(state): State<AppState>,
    Path(id): Path<WebhookConfigurationId>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    load_scoped(&state, id, &current_user, "delete webhooks for").await?;

    if state.store.delete_webhook_configuration(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// Ingestion attempts for a configuration, newest first
#[utoipa::path(
    get,
    path = "/webhook-configurations/{id}/logs",
    tag = "webhook configurations",
    params(("id" = uuid::Uuid, Path, description = "Webhook configuration ID")),
    responses(
        (status = 200, description = "Webhook logs", body = [WebhookLogResponse]),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_webhook_logs(
    State(state): State<AppState>,
    Path(id): Path<WebhookConfigurationId>,
    current_user: CurrentUser,
) -> Result<Json<Vec<WebhookLogResponse>>> {
    load_scoped(&state, id, &current_user, "read webhook logs for").await?;

    let logs = state.store.list_webhook_logs(id).await?;
    Ok(Json(logs.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::webhook_configurations::{WebhookConfigurationResponse, WebhookLogResponse},
        test_utils::*,
        types::Role,
    };
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_create_ingest_and_read_logs() {
        let app = create_test_app();
        let creche = create_test_creche(&app.store, "Happy Feet", None).await;
        let manager = create_test_user(&app.store, Role::CrecheManager, Some(creche.id)).await;
        let (name, value) = app.auth_header(&manager);

        let response = app
            .server
            .post("/admin/api/v1/webhook-configurations")
            .add_header(name.clone(), value.clone())
            .json(&json!({"creche_id": creche.id, "name": "Facebook lead form"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let configuration: WebhookConfigurationResponse = response.json();
        assert!(configuration.webhook_key.starts_with("whk_"));
        assert!(configuration.enabled);
        assert_eq!(
            configuration.ingest_url,
            format!("/functions/v1/webhook/{}", configuration.webhook_key)
        );

        app.server
            .post(&configuration.ingest_url)
            .add_header("user-agent", "lead-form/2")
            .json(&json!({"name": "Kagiso"}))
            .await
            .assert_status_ok();

        // The log row is written off the request path
        let mut logs: Vec<WebhookLogResponse> = Vec::new();
        for _ in 0..50 {
            logs = app
                .server
                .get(&format!("/admin/api/v1/webhook-configurations/{}/logs", configuration.id))
                .add_header(name.clone(), value.clone())
                .await
                .json();
            if !logs.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, "success");
        assert_eq!(logs[0].user_agent.as_deref(), Some("lead-form/2"));
    }

    #[tokio::test]
    async fn test_rotate_key_invalidates_old_url() {
        let app = create_test_app();
        let creche = create_test_creche(&app.store, "Happy Feet", None).await;
        let admin = create_test_user(&app.store, Role::Admin, None).await;
        let (name, value) = app.auth_header(&admin);

        let original: WebhookConfigurationResponse = app
            .server
            .post("/admin/api/v1/webhook-configurations")
            .add_header(name.clone(), value.clone())
            .json(&json!({"creche_id": creche.id, "name": "Website"}))
            .await
            .json();

        let rotated: WebhookConfigurationResponse = app
            .server
            .post(&format!("/admin/api/v1/webhook-configurations/{}/rotate-key", original.id))
            .add_header(name, value)
            .await
            .json();
        assert_ne!(rotated.webhook_key, original.webhook_key);

        app.server
            .post(&original.ingest_url)
            .json(&json!({"name": "A"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        app.server
            .post(&rotated.ingest_url)
            .json(&json!({"name": "A"}))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_disable_then_delete() {
        let app = create_test_app();
        let creche = create_test_creche(&app.store, "Happy Feet", None).await;
        let admin = create_test_user(&app.store, Role::Admin, None).await;
        let (name, value) = app.auth_header(&admin);

        let configuration: WebhookConfigurationResponse = app
            .server
            .post("/admin/api/v1/webhook-configurations")
            .add_header(name.clone(), value.clone())
            .json(&json!({"creche_id": creche.id, "name": "Website"}))
            .await
            .json();
        let path = format!("/admin/api/v1/webhook-configurations/{}", configuration.id);

        let disabled: WebhookConfigurationResponse = app
            .server
            .patch(&path)
            .add_header(name.clone(), value.clone())
            .json(&json!({"enabled": false}))
            .await
            .json();
        assert!(!disabled.enabled);
        assert_eq!(disabled.webhook_key, configuration.webhook_key);

        app.server
            .delete(&path)
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.server
            .delete(&path)
            .add_header(name, value)
            .await
            .assert_status_not_found();
    }
}
