//! HTTP handlers for the signed-in user's notifications.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{notifications::NotificationResponse, users::CurrentUser},
    errors::{Error, Result},
    types::NotificationId,
};

/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    responses(
        (status = 200, description = "Notifications", body = [NotificationResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<Vec<NotificationResponse>>> {
    let notifications = state.store.list_notifications(current_user.id).await?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// Mark one of the caller's notifications as read
#[utoipa::path(
    patch,
    path = "/notifications/{id}/read",
    tag = "notifications",
    params(("id" = uuid::Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read", body = NotificationResponse),
        (status = 404, description = "No such notification for this user"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
    current_user: CurrentUser,
) -> Result<Json<NotificationResponse>> {
    // Other users' notifications look exactly like missing ones
    let notification = state
        .store
        .mark_notification_read(id, current_user.id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Notification".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(notification.into()))
}
