//! Public lead ingestion endpoint.
//!
//! Mounted outside the admin CORS layer: any origin may post, and every response (including
//! errors and the preflight) carries `Access-Control-Allow-Origin: *`.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::{
    AppState,
    webhooks::{IngestError, Ingestor, RequestMeta},
};

const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
];

/// CORS preflight
pub async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, CORS_HEADERS)
}

/// Submit a lead for the creche owning `webhook_key`
#[utoipa::path(
    post,
    path = "/functions/v1/webhook/{webhook_key}",
    tag = "webhooks",
    params(("webhook_key" = String, Path, description = "Secret key identifying the webhook configuration")),
    request_body(content = Object, description = "Free-form JSON object; `name`, `email`, `phone` and `message` are read"),
    responses(
        (status = 200, description = "Lead created", example = json!({"success": true})),
        (status = 400, description = "Rejected", example = json!({"error": "Invalid webhook key"})),
        (status = 413, description = "Body exceeds the configured payload limit"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn ingest(
    State(state): State<AppState>,
    Path(webhook_key): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => run(&state, Some(&webhook_key), &headers, &body).await,
        Err(rejection) => unreadable_body(rejection),
    }
}

/// The base path with no key segment
#[tracing::instrument(skip_all)]
pub async fn ingest_without_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => run(&state, None, &headers, &body).await,
        Err(rejection) => unreadable_body(rejection),
    }
}

/// Oversized or truncated bodies keep the public response shape
fn unreadable_body(rejection: BytesRejection) -> Response {
    warn!(status = %rejection.status(), "webhook body could not be read: {}", rejection.body_text());
    (rejection.status(), CORS_HEADERS, Json(json!({"error": rejection.body_text()}))).into_response()
}

async fn run(state: &AppState, webhook_key: Option<&str>, headers: &HeaderMap, body: &[u8]) -> Response {
    let ingestor = Ingestor::new(state.store.clone(), state.config.webhooks.apply_field_mapping);
    // Telemetry keeps running after the response; dropping the handle detaches it
    let ingestion = ingestor.ingest(webhook_key, body, RequestMeta::from_headers(headers)).await;

    match ingestion.outcome {
        Ok(_) => (StatusCode::OK, CORS_HEADERS, Json(json!({"success": true}))).into_response(),
        Err(e) => rejection(&e),
    }
}

fn rejection(error: &IngestError) -> Response {
    (StatusCode::BAD_REQUEST, CORS_HEADERS, Json(json!({"error": error.to_string()}))).into_response()
}
