//! Read-only analytics endpoints.
//!
//! Every request re-reads the collections it needs concurrently and computes the figures in
//! memory with [`crate::analytics`]. Creche managers only ever see their own creche.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use crate::{
    AppState,
    analytics::{self, CrecheUtilization, ProvinceRollup, RevenueBucket, Summary, SummaryInputs},
    api::models::{
        analytics::{AnalyticsQuery, RevenueGrouping, RevenueQuery},
        users::CurrentUser,
    },
    auth::permissions,
    db::models::{
        applications::ApplicationFilter, creches::CrecheFilter, invoices::InvoiceFilter, students::StudentFilter,
        users::UserFilter,
    },
    errors::{Error, Result},
};

fn creche_filter(creche_id: Option<uuid::Uuid>) -> CrecheFilter {
    CrecheFilter {
        id: creche_id,
        ..Default::default()
    }
}

fn student_filter(creche_id: Option<uuid::Uuid>) -> StudentFilter {
    StudentFilter {
        creche_id,
        ..Default::default()
    }
}

/// Platform-wide (or single-creche) headline figures
#[utoipa::path(
    get,
    path = "/analytics/summary",
    tag = "analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Headline figures", body = Summary),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Summary>> {
    let creche_id = permissions::scoped_creche_filter(&current_user, query.creche_id)?;
    let window = chrono::Duration::from_std(state.config.analytics.active_user_window).map_err(|e| Error::Internal {
        operation: format!("convert active user window: {e}"),
    })?;

    let store = &state.store;
    let creches_filter = creche_filter(creche_id);
    let students_filter = student_filter(creche_id);
    let invoice_filter = InvoiceFilter {
        creche_id,
        ..Default::default()
    };
    let application_filter = ApplicationFilter {
        creche_id,
        ..Default::default()
    };
    let user_filter = UserFilter::default();
    let (creches, students, invoices, applications, mut users) = tokio::try_join!(
        store.list_creches(&creches_filter),
        store.list_students(&students_filter),
        store.list_invoices(&invoice_filter),
        store.list_applications(&application_filter),
        store.list_users(&user_filter),
    )?;
    if creche_id.is_some() {
        users.retain(|u| u.creche_id == creche_id);
    }

    let inputs = SummaryInputs {
        creches: &creches,
        students: &students,
        invoices: &invoices,
        applications: &applications,
        users: &users,
    };
    Ok(Json(analytics::summary(inputs, chrono::Utc::now(), window)))
}

/// Creches and enrolled students per province
#[utoipa::path(
    get,
    path = "/analytics/provinces",
    tag = "analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "One row per province, sorted by name", body = [ProvinceRollup]),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn get_provinces(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<ProvinceRollup>>> {
    let creche_id = permissions::scoped_creche_filter(&current_user, query.creche_id)?;
    let creches_filter = creche_filter(creche_id);
    let students_filter = student_filter(creche_id);
    let (creches, students) = tokio::try_join!(
        state.store.list_creches(&creches_filter),
        state.store.list_students(&students_filter),
    )?;

    let enrollment = analytics::enrollment_by_creche(&students);
    Ok(Json(analytics::province_rollup(&creches, &enrollment)))
}

/// Enrolled students against capacity for each creche
#[utoipa::path(
    get,
    path = "/analytics/utilization",
    tag = "analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Utilization per creche", body = [CrecheUtilization]),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn get_utilization(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<CrecheUtilization>>> {
    let creche_id = permissions::scoped_creche_filter(&current_user, query.creche_id)?;
    let creches_filter = creche_filter(creche_id);
    let students_filter = student_filter(creche_id);
    let (creches, students) = tokio::try_join!(
        state.store.list_creches(&creches_filter),
        state.store.list_students(&students_filter),
    )?;

    let enrollment = analytics::enrollment_by_creche(&students);
    Ok(Json(analytics::creche_utilization(&creches, &enrollment)))
}

/// Invoice totals grouped by creche or by month issued
#[utoipa::path(
    get,
    path = "/analytics/revenue",
    tag = "analytics",
    params(RevenueQuery),
    responses(
        (status = 200, description = "Revenue buckets in ascending key order", body = [RevenueBucket]),
        (status = 403, description = "Forbidden"),
    ),
    security(("CookieAuth" = []))
)]
#[instrument(skip_all)]
pub async fn get_revenue(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<RevenueBucket>>> {
    let creche_id = permissions::scoped_creche_filter(&current_user, query.creche_id)?;
    let invoices = state
        .store
        .list_invoices(&InvoiceFilter {
            creche_id,
            ..Default::default()
        })
        .await?;

    let buckets = match query.group_by {
        RevenueGrouping::Creche => analytics::revenue_by_creche(&invoices),
        RevenueGrouping::Month => analytics::revenue_by_month(&invoices),
    };
    Ok(Json(buckets))
}

#[cfg(test)]
mod tests {
    use crate::{
        db::{
            models::{applications::Application, invoices::InvoiceCreateDBRequest, students::StudentCreateDBRequest},
            store::Store,
        },
        test_utils::*,
        types::{InvoiceStatus, Role},
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::Value;
    use std::str::FromStr;
    use uuid::Uuid;

    async fn enrol(app: &TestApp, creche_id: Uuid, count: usize) {
        for i in 0..count {
            app.store
                .create_student(&StudentCreateDBRequest {
                    creche_id,
                    first_name: format!("Child {i}"),
                    last_name: "Test".to_string(),
                    date_of_birth: None,
                    parent_name: None,
                    parent_phone_number: None,
                    enrolled: true,
                })
                .await
                .unwrap();
        }
    }

    async fn invoice(app: &TestApp, creche_id: Uuid, amount: &str, month: u32) {
        app.store
            .create_invoice(&InvoiceCreateDBRequest {
                creche_id,
                student_id: None,
                total_amount: Decimal::from_str(amount).unwrap(),
                status: InvoiceStatus::Paid,
                issued_at: Utc.with_ymd_and_hms(2025, month, 1, 0, 0, 0).unwrap(),
                due_at: None,
            })
            .await
            .unwrap();
    }

    fn raw_application(creche_id: Uuid, status: &str) -> Application {
        let now = Utc::now();
        Application {
            id: Uuid::new_v4(),
            creche_id,
            parent_name: "Thandi".to_string(),
            parent_email: None,
            parent_phone_number: "0821234567".to_string(),
            message: String::new(),
            status: status.to_string(),
            source: "website".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_province_rollup_groups_and_defaults_unknown() {
        let app = create_test_app();
        let a = create_test_creche(&app.store, "Sunshine", Some("Gauteng")).await;
        let b = create_test_creche(&app.store, "Rainbow", Some("Gauteng")).await;
        let c = create_test_creche(&app.store, "Nowhere", None).await;
        enrol(&app, a.id, 2).await;
        enrol(&app, b.id, 3).await;
        enrol(&app, c.id, 1).await;

        let staff = create_test_user(&app.store, Role::Staff, None).await;
        let (name, value) = app.auth_header(&staff);
        let rows: Value = app
            .server
            .get("/admin/api/v1/analytics/provinces")
            .add_header(name, value)
            .await
            .json();

        assert_eq!(
            rows,
            serde_json::json!([
                {"province": "Gauteng", "creches": 2, "students": 5},
                {"province": "Unknown", "creches": 1, "students": 1},
            ])
        );
    }

    #[tokio::test]
    async fn test_revenue_is_exact_and_grouped_by_month() {
        let app = create_test_app();
        let creche = create_test_creche(&app.store, "Sunshine", Some("Gauteng")).await;
        invoice(&app, creche.id, "100.50", 3).await;
        invoice(&app, creche.id, "249.50", 1).await;

        let admin = create_test_user(&app.store, Role::Admin, None).await;
        let (name, value) = app.auth_header(&admin);

        let summary: Value = app
            .server
            .get("/admin/api/v1/analytics/summary")
            .add_header(name.clone(), value.clone())
            .await
            .json();
        assert_eq!(summary["total_revenue"], "350.00");

        let months: Value = app
            .server
            .get("/admin/api/v1/analytics/revenue?group_by=month")
            .add_header(name, value)
            .await
            .json();
        assert_eq!(months[0]["key"], "2025-01");
        assert_eq!(months[1]["key"], "2025-03");
    }

    #[tokio::test]
    async fn test_pending_applications_report_unrecognized_statuses() {
        let app = create_test_app();
        let creche = create_test_creche(&app.store, "Sunshine", None).await;
        let lowercase = raw_application(creche.id, "new");
        app.store.insert_application_row(raw_application(creche.id, "New"));
        app.store.insert_application_row(raw_application(creche.id, "Contacted"));
        app.store.insert_application_row(lowercase.clone());

        let admin = create_test_user(&app.store, Role::Admin, None).await;
        let (name, value) = app.auth_header(&admin);
        let summary: Value = app
            .server
            .get("/admin/api/v1/analytics/summary")
            .add_header(name, value)
            .await
            .json();

        assert_eq!(summary["pending_applications"], 1);
        assert_eq!(summary["unrecognized_statuses"][0]["status"], "new");
        assert_eq!(
            summary["unrecognized_statuses"][0]["application_id"],
            lowercase.id.to_string()
        );
    }

    #[tokio::test]
    async fn test_managers_see_only_their_creche() {
        let app = create_test_app();
        let mine = create_test_creche(&app.store, "Mine", Some("Limpopo")).await;
        let other = create_test_creche(&app.store, "Other", Some("Gauteng")).await;
        enrol(&app, other.id, 4).await;

        let manager = create_test_user(&app.store, Role::CrecheManager, Some(mine.id)).await;
        let (name, value) = app.auth_header(&manager);

        let summary: Value = app
            .server
            .get("/admin/api/v1/analytics/summary")
            .add_header(name.clone(), value.clone())
            .await
            .json();
        assert_eq!(summary["creches"], 1);
        assert_eq!(summary["students"], 0);
        assert_eq!(summary["active_users"], 1);

        app.server
            .get(&format!("/admin/api/v1/analytics/utilization?creche_id={}", other.id))
            .add_header(name, value)
            .await
            .assert_status_forbidden();
    }
}
