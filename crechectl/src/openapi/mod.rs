//! OpenAPI documentation, served by Scalar at `/admin/docs`.
//!
//! [`ApiDoc`] covers the root-level authentication and webhook routes and nests [`AdminApiDoc`]
//! (everything under `/admin/api/v1`).

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::{analytics, api, auth};

struct CookieSecurityAddon;

impl Modify for CookieSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.security_schemes.insert(
            "CookieAuth".to_string(),
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "crechectl_session",
                "Session cookie set by `POST /authentication/login`. The name follows `auth.session.cookie_name`.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::creches::list_creches,
        api::handlers::creches::create_creche,
        api::handlers::creches::get_creche,
        api::handlers::creches::update_creche,
        api::handlers::students::list_students,
        api::handlers::students::create_student,
        api::handlers::applications::list_applications,
        api::handlers::applications::create_application,
        api::handlers::applications::update_application,
        api::handlers::invoices::list_invoices,
        api::handlers::invoices::create_invoice,
        api::handlers::support_tickets::list_support_tickets,
        api::handlers::support_tickets::create_support_ticket,
        api::handlers::support_tickets::update_support_ticket,
        api::handlers::webhook_configurations::list_webhook_configurations,
        api::handlers::webhook_configurations::create_webhook_configuration,
        api::handlers::webhook_configurations::update_webhook_configuration,
        api::handlers::webhook_configurations::rotate_webhook_key,
        api::handlers::webhook_configurations::delete_webhook_configuration,
        api::handlers::webhook_configurations::list_webhook_logs,
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::update_user,
        api::handlers::events::list_events,
        api::handlers::events::create_event,
        api::handlers::notifications::list_notifications,
        api::handlers::notifications::mark_notification_read,
        api::handlers::analytics::get_summary,
        api::handlers::analytics::get_provinces,
        api::handlers::analytics::get_utilization,
        api::handlers::analytics::get_revenue,
    ),
    components(schemas(
        analytics::Summary,
        analytics::ProvinceRollup,
        analytics::CrecheUtilization,
        analytics::RevenueBucket,
        analytics::UnrecognizedStatus,
        api::models::analytics::RevenueGrouping,
    )),
    tags(
        (name = "creches", description = "Creche records and settings"),
        (name = "students", description = "Enrolled and prospective children"),
        (name = "applications", description = "Enrollment leads"),
        (name = "invoices", description = "Billing"),
        (name = "support_tickets", description = "Support requests raised by creches"),
        (name = "webhook_configurations", description = "Inbound lead integrations and their delivery logs"),
        (name = "users", description = "Dashboard users (admin only)"),
        (name = "events", description = "Creche calendar"),
        (name = "notifications", description = "Per-user notifications"),
        (name = "analytics", description = "Read-only dashboard aggregates"),
    )
)]
pub struct AdminApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "crechectl",
        description = "Admin API for a multi-tenant creche management platform"
    ),
    modifiers(&CookieSecurityAddon),
    paths(
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::get_session,
        api::handlers::auth::session_events,
        api::handlers::webhook_ingest::ingest,
    ),
    components(schemas(auth::events::SessionEvent, auth::events::SessionEventKind)),
    nest(
        (path = "/admin/api/v1", api = AdminApiDoc)
    ),
    tags(
        (name = "authentication", description = "Session sign-in and sign-out"),
        (name = "webhooks", description = "Public lead ingestion"),
    )
)]
pub struct ApiDoc;
