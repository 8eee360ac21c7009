//! HTTP handlers for creche calendar events.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        events::{EventCreate, EventResponse, ListEventsQuery},
        users::CurrentUser,
    },
    auth::permissions,
    db::models::events::EventFilter,
    errors::{Error, Result},
};

/// List events by start time
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "Events", body = [EventResponse]),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<EventResponse>>> {
    let filter = EventFilter {
        creche_id: permissions::scoped_creche_filter(&current_user, query.creche_id)?,
    };

    let events = state.store.list_events(&filter).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// Schedule an event
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    request_body = EventCreate,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn create_event(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<EventCreate>,
) -> Result<(StatusCode, Json<EventResponse>)> {
    permissions::ensure_creche_access(&current_user, request.creche_id, "schedule events for")?;

    if request.ends_at.is_some_and(|end| end < request.starts_at) {
        return Err(Error::BadRequest {
            message: "Event cannot end before it starts".to_string(),
        });
    }

    let event = state.store.create_event(&request.into()).await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

#[cfg(test)]
mod tests {
    use crate::{api::models::events::EventResponse, test_utils::*, types::Role};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_events_sorted_and_validated() {
        let app = create_test_app();
        let creche = create_test_creche(&app.store, "Little Lambs", None).await;
        let manager = create_test_user(&app.store, Role::CrecheManager, Some(creche.id)).await;
        let (name, value) = app.auth_header(&manager);

        for (title, starts_at) in [("Sports day", "2025-09-20T08:00:00Z"), ("Open day", "2025-03-01T09:00:00Z")] {
            app.server
                .post("/admin/api/v1/events")
                .add_header(name.clone(), value.clone())
                .json(&json!({"creche_id": creche.id, "title": title, "starts_at": starts_at}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        app.server
            .post("/admin/api/v1/events")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "creche_id": creche.id,
                "title": "Backwards",
                "starts_at": "2025-03-02T09:00:00Z",
                "ends_at": "2025-03-01T09:00:00Z"
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let events: Vec<EventResponse> = app
            .server
            .get("/admin/api/v1/events")
            .add_header(name, value)
            .await
            .json();
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Open day", "Sports day"]);
    }
}
