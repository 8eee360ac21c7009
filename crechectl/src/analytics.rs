//! Dashboard aggregates.
//!
//! Everything here is a pure function over fully-fetched collections. Handlers fetch the rows
//! they need concurrently and recompute on every request; nothing is cached.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::db::models::{applications::Application, creches::Creche, invoices::Invoice, students::Student, users::User};
use crate::types::{ApplicationId, ApplicationStatus, CrecheId, abbrev_uuid};

/// Bucket for creches without a province
pub const UNKNOWN_PROVINCE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProvinceRollup {
    pub province: String,
    pub creches: i64,
    pub students: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CrecheUtilization {
    #[schema(value_type = String, format = Uuid)]
    pub creche_id: CrecheId,
    pub name: String,
    pub enrolled: i64,
    pub capacity: Option<i32>,
    /// Percentage, 0 when capacity is unknown or not positive
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RevenueBucket {
    /// Creche id or `YYYY-MM`, depending on the grouping
    pub key: String,
    #[schema(value_type = String)]
    pub total: Decimal,
}

/// A stored application status outside the known vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UnrecognizedStatus {
    #[schema(value_type = String, format = Uuid)]
    pub application_id: ApplicationId,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingApplications {
    pub count: i64,
    pub unrecognized: Vec<UnrecognizedStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Summary {
    pub creches: i64,
    /// Enrolled students, the same population utilization is computed over
    pub students: i64,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    pub pending_applications: i64,
    pub unrecognized_statuses: Vec<UnrecognizedStatus>,
    pub active_users: i64,
    pub average_utilization: f64,
}

/// Enrolled students per creche. Creches with no students are absent.
pub fn enrollment_by_creche(students: &[Student]) -> HashMap<CrecheId, i64> {
    let mut counts = HashMap::new();
    for student in students.iter().filter(|s| s.enrolled) {
        *counts.entry(student.creche_id).or_insert(0) += 1;
    }
    counts
}

fn province_of(creche: &Creche) -> &str {
    match creche.province.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => UNKNOWN_PROVINCE,
    }
}

/// Creche and enrolled-student counts per province, sorted by province name.
pub fn province_rollup(creches: &[Creche], enrollment: &HashMap<CrecheId, i64>) -> Vec<ProvinceRollup> {
    let mut buckets: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for creche in creches {
        let bucket = buckets.entry(province_of(creche)).or_default();
        bucket.0 += 1;
        bucket.1 += enrollment.get(&creche.id).copied().unwrap_or(0);
    }

    buckets
        .into_iter()
        .map(|(province, (creches, students))| ProvinceRollup {
            province: province.to_string(),
            creches,
            students,
        })
        .collect()
}

/// `enrolled / capacity * 100`. Always finite.
pub fn utilization(enrolled: i64, capacity: Option<i32>) -> f64 {
    match capacity {
        Some(capacity) if capacity > 0 => enrolled as f64 / f64::from(capacity) * 100.0,
        _ => 0.0,
    }
}

pub fn creche_utilization(creches: &[Creche], enrollment: &HashMap<CrecheId, i64>) -> Vec<CrecheUtilization> {
    creches
        .iter()
        .map(|creche| {
            let enrolled = enrollment.get(&creche.id).copied().unwrap_or(0);
            CrecheUtilization {
                creche_id: creche.id,
                name: creche.name.clone(),
                enrolled,
                capacity: creche.capacity,
                utilization: utilization(enrolled, creche.capacity),
            }
        })
        .collect()
}

/// Mean utilization across creches with a positive capacity.
pub fn average_utilization(rows: &[CrecheUtilization]) -> f64 {
    let sized: Vec<f64> = rows
        .iter()
        .filter(|r| r.capacity.is_some_and(|c| c > 0))
        .map(|r| r.utilization)
        .collect();
    if sized.is_empty() {
        0.0
    } else {
        sized.iter().sum::<f64>() / sized.len() as f64
    }
}

pub fn total_revenue(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(|i| i.total_amount).sum::<Decimal>().round_dp(2)
}

fn grouped_revenue<K: Ord>(invoices: &[Invoice], key: impl Fn(&Invoice) -> K, render: impl Fn(K) -> String) -> Vec<RevenueBucket> {
    let mut totals: BTreeMap<K, Decimal> = BTreeMap::new();
    for invoice in invoices {
        *totals.entry(key(invoice)).or_default() += invoice.total_amount;
    }
    totals
        .into_iter()
        .map(|(k, total)| RevenueBucket {
            key: render(k),
            total: total.round_dp(2),
        })
        .collect()
}

pub fn revenue_by_creche(invoices: &[Invoice]) -> Vec<RevenueBucket> {
    grouped_revenue(invoices, |i| i.creche_id, |id| id.to_string())
}

/// Revenue per calendar month of `issued_at`, ascending.
pub fn revenue_by_month(invoices: &[Invoice]) -> Vec<RevenueBucket> {
    grouped_revenue(invoices, |i| i.issued_at.format("%Y-%m").to_string(), |k| k)
}

/// Count applications still in `New`. Statuses that don't parse are excluded from the count and
/// returned so callers can surface them.
pub fn pending_applications(applications: &[Application]) -> PendingApplications {
    let mut pending = PendingApplications::default();
    for application in applications {
        match application.parsed_status() {
            Ok(ApplicationStatus::New) => pending.count += 1,
            Ok(_) => {}
            Err(e) => {
                warn!(application_id = %abbrev_uuid(&application.id), "{e}");
                pending.unrecognized.push(UnrecognizedStatus {
                    application_id: application.id,
                    status: application.status.clone(),
                });
            }
        }
    }
    pending
}

/// Users touched within `window` of `now`.
pub fn active_users(users: &[User], now: DateTime<Utc>, window: Duration) -> i64 {
    let cutoff = now - window;
    users.iter().filter(|u| u.updated_at >= cutoff).count() as i64
}

pub struct SummaryInputs<'a> {
    pub creches: &'a [Creche],
    pub students: &'a [Student],
    pub invoices: &'a [Invoice],
    pub applications: &'a [Application],
    pub users: &'a [User],
}

pub fn summary(inputs: SummaryInputs<'_>, now: DateTime<Utc>, active_window: Duration) -> Summary {
    let enrollment = enrollment_by_creche(inputs.students);
    let pending = pending_applications(inputs.applications);
    let utilization = creche_utilization(inputs.creches, &enrollment);
    Summary {
        creches: inputs.creches.len() as i64,
        students: enrollment.values().sum(),
        total_revenue: total_revenue(inputs.invoices),
        pending_applications: pending.count,
        unrecognized_statuses: pending.unrecognized,
        active_users: active_users(inputs.users, now, active_window),
        average_utilization: average_utilization(&utilization),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn creche(name: &str, province: Option<&str>, capacity: Option<i32>) -> Creche {
        let now = Utc::now();
        Creche {
            id: Uuid::new_v4(),
            name: name.to_string(),
            province: province.map(str::to_string),
            address: None,
            phone_number: None,
            email: None,
            capacity,
            price_monthly: None,
            price_weekly: None,
            registered: true,
            features: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn students_for(creche_id: CrecheId, count: usize) -> Vec<Student> {
        let now = Utc::now();
        (0..count)
            .map(|n| Student {
                id: Uuid::new_v4(),
                creche_id,
                first_name: format!("Child{n}"),
                last_name: "Dlamini".to_string(),
                date_of_birth: None,
                parent_name: None,
                parent_phone_number: None,
                enrolled: true,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    fn invoice(creche_id: CrecheId, amount: &str, issued_at: DateTime<Utc>) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            creche_id,
            student_id: None,
            total_amount: amount.parse().unwrap(),
            status: "paid".to_string(),
            issued_at,
            due_at: None,
        }
    }

    fn application(status: &str) -> Application {
        let now = Utc::now();
        Application {
            id: Uuid::new_v4(),
            creche_id: Uuid::new_v4(),
            parent_name: "Parent".to_string(),
            parent_email: None,
            parent_phone_number: "Unknown".to_string(),
            message: String::new(),
            status: status.to_string(),
            source: "website".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_utilization() {
        assert_eq!(utilization(5, Some(20)), 25.0);
        assert_eq!(utilization(5, Some(0)), 0.0);
        assert_eq!(utilization(5, Some(-3)), 0.0);
        assert_eq!(utilization(5, None), 0.0);
        assert!(utilization(0, Some(0)).is_finite());
    }

    #[test]
    fn test_province_rollup_groups_and_buckets_unknown() {
        let a = creche("A", Some("Gauteng"), Some(10));
        let b = creche("B", Some("Gauteng"), Some(10));
        let c = creche("C", None, None);
        let d = creche("D", Some("  "), None);

        let mut students = students_for(a.id, 3);
        students.extend(students_for(b.id, 7));
        students.extend(students_for(c.id, 1));
        let enrollment = enrollment_by_creche(&students);

        let rollup = province_rollup(&[a, b, c, d], &enrollment);
        assert_eq!(
            rollup,
            vec![
                ProvinceRollup {
                    province: "Gauteng".to_string(),
                    creches: 2,
                    students: 10,
                },
                ProvinceRollup {
                    province: "Unknown".to_string(),
                    creches: 2,
                    students: 1,
                },
            ]
        );
    }

    #[test]
    fn test_unenrolled_students_are_not_counted() {
        let a = creche("A", Some("Limpopo"), Some(4));
        let mut students = students_for(a.id, 2);
        students[0].enrolled = false;

        let rows = creche_utilization(&[a], &enrollment_by_creche(&students));
        assert_eq!(rows[0].enrolled, 1);
        assert_eq!(rows[0].utilization, 25.0);
    }

    #[test]
    fn test_revenue_sum_is_exact() {
        let id = Uuid::new_v4();
        let issued = Utc::now();
        let invoices = vec![invoice(id, "100.50", issued), invoice(id, "249.50", issued)];

        let total = total_revenue(&invoices);
        assert_eq!(total, "350.00".parse::<Decimal>().unwrap());
        assert_eq!(total.to_string(), "350.00");
    }

    #[test]
    fn test_revenue_by_month_and_creche() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let invoices = vec![
            invoice(a, "10.10", feb),
            invoice(a, "20.20", jan),
            invoice(b, "0.70", jan),
        ];

        let months = revenue_by_month(&invoices);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].key, "2024-01");
        assert_eq!(months[0].total, "20.90".parse::<Decimal>().unwrap());
        assert_eq!(months[1].key, "2024-02");

        let per_creche = revenue_by_creche(&invoices);
        let a_total = per_creche.iter().find(|r| r.key == a.to_string()).unwrap();
        assert_eq!(a_total.total, "30.30".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_pending_applications_is_case_sensitive() {
        let rows = vec![application("New"), application("new"), application("Contacted")];
        let pending = pending_applications(&rows);

        // "new" is not counted, and is reported rather than silently dropped
        assert_eq!(pending.count, 1);
        assert_eq!(pending.unrecognized.len(), 1);
        assert_eq!(pending.unrecognized[0].status, "new");
        assert_eq!(pending.unrecognized[0].application_id, rows[1].id);
    }

    #[test]
    fn test_active_users_window() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let user = |updated_at| User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            display_name: None,
            password_hash: None,
            role: "staff".to_string(),
            creche_id: None,
            created_at: updated_at,
            updated_at,
        };
        let users = vec![
            user(now - Duration::days(1)),
            user(now - Duration::days(29)),
            user(now - Duration::days(31)),
        ];

        assert_eq!(active_users(&users, now, Duration::days(30)), 2);
    }

    #[test]
    fn test_summary_with_empty_inputs() {
        let summary = summary(
            SummaryInputs {
                creches: &[],
                students: &[],
                invoices: &[],
                applications: &[],
                users: &[],
            },
            Utc::now(),
            Duration::days(30),
        );
        assert_eq!(summary.creches, 0);
        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.average_utilization, 0.0);
    }

    #[test]
    fn test_summary_counts_only_enrolled_students() {
        let a = creche("Little Acorns", Some("Gauteng"), Some(4));
        let mut students = students_for(a.id, 3);
        students[2].enrolled = false;

        let summary = summary(
            SummaryInputs {
                creches: std::slice::from_ref(&a),
                students: &students,
                invoices: &[],
                applications: &[],
                users: &[],
            },
            Utc::now(),
            Duration::days(30),
        );
        assert_eq!(summary.students, 2);
        assert_eq!(summary.average_utilization, 50.0);
    }
}
