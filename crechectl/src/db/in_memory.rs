//! In-memory store implementation.
//!
//! Every table is a concurrent `DashMap` keyed by id. Suitable for development and tests; all data
//! is lost on restart. Unique and foreign-key constraints that PostgreSQL enforces are checked here
//! too so both stores fail the same way.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use uuid::Uuid;

use crate::db::errors::{DbError, Result};
use crate::db::models::{
    applications::{Application, ApplicationCreateDBRequest, ApplicationFilter, ApplicationUpdateDBRequest},
    creches::{Creche, CrecheCreateDBRequest, CrecheFilter, CrecheUpdateDBRequest},
    events::{Event, EventCreateDBRequest, EventFilter},
    invoices::{Invoice, InvoiceCreateDBRequest, InvoiceFilter},
    notifications::{Notification, NotificationCreateDBRequest},
    students::{Student, StudentCreateDBRequest, StudentFilter},
    support_tickets::{SupportTicket, SupportTicketCreateDBRequest, SupportTicketFilter, SupportTicketUpdateDBRequest},
    users::{User, UserCreateDBRequest, UserFilter, UserUpdateDBRequest},
    webhooks::{
        WebhookConfiguration, WebhookConfigurationCreateDBRequest, WebhookConfigurationFilter,
        WebhookConfigurationUpdateDBRequest, WebhookLog, WebhookLogCreateDBRequest,
    },
};
use crate::db::store::Store;
use crate::types::{
    ApplicationId, CrecheId, NotificationId, SupportTicketId, UserId, WebhookConfigurationId,
};

#[derive(Default)]
struct Tables {
    creches: DashMap<Uuid, Creche>,
    students: DashMap<Uuid, Student>,
    applications: DashMap<Uuid, Application>,
    invoices: DashMap<Uuid, Invoice>,
    support_tickets: DashMap<Uuid, SupportTicket>,
    webhook_configurations: DashMap<Uuid, WebhookConfiguration>,
    /// webhook_key -> configuration id, the in-memory unique index
    webhook_keys: DashMap<String, Uuid>,
    webhook_logs: DashMap<Uuid, WebhookLog>,
    users: DashMap<Uuid, User>,
    /// lowercased email -> user id
    user_emails: DashMap<String, Uuid>,
    events: DashMap<Uuid, Event>,
    notifications: DashMap<Uuid, Notification>,
}

/// In-memory implementation of the [`Store`] trait.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn require_creche(&self, creche_id: CrecheId, table: &str) -> Result<()> {
        if self.tables.creches.contains_key(&creche_id) {
            Ok(())
        } else {
            Err(foreign_key_violation(table, "creche_id"))
        }
    }

    /// Store an application row as-is, status string included. Lets tests reproduce rows written
    /// by other clients with statuses outside the known vocabulary.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn insert_application_row(&self, application: Application) {
        self.tables.applications.insert(application.id, application);
    }
}

fn foreign_key_violation(table: &str, column: &str) -> DbError {
    DbError::ForeignKeyViolation {
        constraint: Some(format!("{table}_{column}_fkey")),
        table: Some(table.to_string()),
        message: format!("insert or update on table \"{table}\" violates foreign key constraint on {column}"),
    }
}

fn unique_violation(table: &str, column: &str) -> DbError {
    DbError::UniqueViolation {
        constraint: Some(format!("{table}_{column}_key")),
        table: Some(table.to_string()),
        message: format!("duplicate key value violates unique constraint on {table}.{column}"),
    }
}

fn collect<T: Clone>(map: &DashMap<Uuid, T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
    map.iter().filter(|r| keep(r.value())).map(|r| r.value().clone()).collect()
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_creche(&self, request: &CrecheCreateDBRequest) -> Result<Creche> {
        let now = Utc::now();
        let creche = Creche {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            province: request.province.clone(),
            address: request.address.clone(),
            phone_number: request.phone_number.clone(),
            email: request.email.clone(),
            capacity: request.capacity,
            price_monthly: request.price_monthly,
            price_weekly: request.price_weekly,
            registered: request.registered,
            features: request.features.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.creches.insert(creche.id, creche.clone());
        Ok(creche)
    }

    async fn get_creche(&self, id: CrecheId) -> Result<Option<Creche>> {
        Ok(self.tables.creches.get(&id).map(|r| r.value().clone()))
    }

    async fn list_creches(&self, filter: &CrecheFilter) -> Result<Vec<Creche>> {
        let mut creches = collect(&self.tables.creches, |c| filter.matches(c));
        creches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(creches)
    }

    async fn update_creche(&self, id: CrecheId, request: &CrecheUpdateDBRequest) -> Result<Option<Creche>> {
        let Some(mut creche) = self.tables.creches.get_mut(&id) else {
            return Ok(None);
        };
        let request = request.clone();
        if let Some(name) = request.name {
            creche.name = name;
        }
        if let Some(province) = request.province {
            creche.province = province;
        }
        if let Some(address) = request.address {
            creche.address = address;
        }
        if let Some(phone_number) = request.phone_number {
            creche.phone_number = phone_number;
        }
        if let Some(email) = request.email {
            creche.email = email;
        }
        if let Some(capacity) = request.capacity {
            creche.capacity = capacity;
        }
        if let Some(price_monthly) = request.price_monthly {
            creche.price_monthly = price_monthly;
        }
        if let Some(price_weekly) = request.price_weekly {
            creche.price_weekly = price_weekly;
        }
        if let Some(registered) = request.registered {
            creche.registered = registered;
        }
        if let Some(features) = request.features {
            creche.features = features;
        }
        creche.updated_at = Utc::now();
        Ok(Some(creche.clone()))
    }

    async fn create_student(&self, request: &StudentCreateDBRequest) -> Result<Student> {
        self.require_creche(request.creche_id, "students")?;
        let now = Utc::now();
        let student = Student {
            id: Uuid::new_v4(),
            creche_id: request.creche_id,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            date_of_birth: request.date_of_birth,
            parent_name: request.parent_name.clone(),
            parent_phone_number: request.parent_phone_number.clone(),
            enrolled: request.enrolled,
            created_at: now,
            updated_at: now,
        };
        self.tables.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        let mut students = collect(&self.tables.students, |s| filter.matches(s));
        students.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(students)
    }

    async fn create_application(&self, request: &ApplicationCreateDBRequest) -> Result<Application> {
        self.require_creche(request.creche_id, "applications")?;
        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            creche_id: request.creche_id,
            parent_name: request.parent_name.clone(),
            parent_email: request.parent_email.clone(),
            parent_phone_number: request.parent_phone_number.clone(),
            message: request.message.clone(),
            status: request.status.to_string(),
            source: request.source.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.applications.insert(application.id, application.clone());
        Ok(application)
    }

    async fn get_application(&self, id: ApplicationId) -> Result<Option<Application>> {
        Ok(self.tables.applications.get(&id).map(|r| r.value().clone()))
    }

    async fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>> {
        let mut applications = collect(&self.tables.applications, |a| filter.matches(a));
        applications.sort_by_key(|a| (Reverse(a.created_at), a.id));
        Ok(applications)
    }

    async fn update_application(
        &self,
        id: ApplicationId,
        request: &ApplicationUpdateDBRequest,
    ) -> Result<Option<Application>> {
        let Some(mut application) = self.tables.applications.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(status) = request.status {
            application.status = status.to_string();
        }
        if let Some(message) = &request.message {
            application.message = message.clone();
        }
        application.updated_at = Utc::now();
        Ok(Some(application.clone()))
    }

    async fn create_invoice(&self, request: &InvoiceCreateDBRequest) -> Result<Invoice> {
        self.require_creche(request.creche_id, "invoices")?;
        if let Some(student_id) = request.student_id
            && !self.tables.students.contains_key(&student_id)
        {
            return Err(foreign_key_violation("invoices", "student_id"));
        }
        let invoice = Invoice {
            id: Uuid::new_v4(),
            creche_id: request.creche_id,
            student_id: request.student_id,
            total_amount: request.total_amount,
            status: request.status.to_string(),
            issued_at: request.issued_at,
            due_at: request.due_at,
        };
        self.tables.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        let mut invoices = collect(&self.tables.invoices, |i| filter.matches(i));
        invoices.sort_by_key(|i| (Reverse(i.issued_at), i.id));
        Ok(invoices)
    }

    async fn create_support_ticket(&self, request: &SupportTicketCreateDBRequest) -> Result<SupportTicket> {
        if let Some(creche_id) = request.creche_id {
            self.require_creche(creche_id, "support_tickets")?;
        }
        let now = Utc::now();
        let ticket = SupportTicket {
            id: Uuid::new_v4(),
            creche_id: request.creche_id,
            user_id: request.user_id,
            subject: request.subject.clone(),
            description: request.description.clone(),
            priority: request.priority.to_string(),
            status: request.status.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tables.support_tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn get_support_ticket(&self, id: SupportTicketId) -> Result<Option<SupportTicket>> {
        Ok(self.tables.support_tickets.get(&id).map(|r| r.value().clone()))
    }

    async fn list_support_tickets(&self, filter: &SupportTicketFilter) -> Result<Vec<SupportTicket>> {
        let mut tickets = collect(&self.tables.support_tickets, |t| filter.matches(t));
        tickets.sort_by_key(|t| (Reverse(t.created_at), t.id));
        Ok(tickets)
    }

    async fn update_support_ticket(
        &self,
        id: SupportTicketId,
        request: &SupportTicketUpdateDBRequest,
    ) -> Result<Option<SupportTicket>> {
        let Some(mut ticket) = self.tables.support_tickets.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(priority) = request.priority {
            ticket.priority = priority.to_string();
        }
        if let Some(status) = request.status {
            ticket.status = status.to_string();
        }
        ticket.updated_at = Utc::now();
        Ok(Some(ticket.clone()))
    }

    async fn create_webhook_configuration(
        &self,
        request: &WebhookConfigurationCreateDBRequest,
    ) -> Result<WebhookConfiguration> {
        self.require_creche(request.creche_id, "webhook_configurations")?;
        let now = Utc::now();
        let configuration = WebhookConfiguration {
            id: Uuid::new_v4(),
            creche_id: request.creche_id,
            name: request.name.clone(),
            webhook_key: request.webhook_key.clone(),
            field_mapping: request.field_mapping.clone(),
            enabled: request.enabled,
            last_used_at: None,
            created_at: now,
            updated_at: now,
        };
        match self.tables.webhook_keys.entry(configuration.webhook_key.clone()) {
            Entry::Occupied(_) => return Err(unique_violation("webhook_configurations", "webhook_key")),
            Entry::Vacant(slot) => {
                slot.insert(configuration.id);
            }
        }
        self.tables
            .webhook_configurations
            .insert(configuration.id, configuration.clone());
        Ok(configuration)
    }

    async fn get_webhook_configuration(&self, id: WebhookConfigurationId) -> Result<Option<WebhookConfiguration>> {
        Ok(self.tables.webhook_configurations.get(&id).map(|r| r.value().clone()))
    }

    async fn find_webhook_configurations_by_key(&self, webhook_key: &str) -> Result<Vec<WebhookConfiguration>> {
        let id = self.tables.webhook_keys.get(webhook_key).map(|r| *r.value());
        Ok(id
            .and_then(|id| self.tables.webhook_configurations.get(&id).map(|r| r.value().clone()))
            .into_iter()
            .collect())
    }

    async fn list_webhook_configurations(&self, filter: &WebhookConfigurationFilter) -> Result<Vec<WebhookConfiguration>> {
        let mut configurations = collect(&self.tables.webhook_configurations, |c| {
            filter.creche_id.is_none_or(|id| c.creche_id == id)
        });
        configurations.sort_by_key(|c| (Reverse(c.created_at), c.id));
        Ok(configurations)
    }

    async fn update_webhook_configuration(
        &self,
        id: WebhookConfigurationId,
        request: &WebhookConfigurationUpdateDBRequest,
    ) -> Result<Option<WebhookConfiguration>> {
        let Some(mut configuration) = self.tables.webhook_configurations.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(new_key) = &request.webhook_key {
            match self.tables.webhook_keys.entry(new_key.clone()) {
                Entry::Occupied(_) => return Err(unique_violation("webhook_configurations", "webhook_key")),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.tables.webhook_keys.remove(&configuration.webhook_key);
            configuration.webhook_key = new_key.clone();
        }
        if let Some(name) = &request.name {
            configuration.name = name.clone();
        }
        if let Some(mapping) = &request.field_mapping {
            configuration.field_mapping = mapping.clone();
        }
        if let Some(enabled) = request.enabled {
            configuration.enabled = enabled;
        }
        configuration.updated_at = Utc::now();
        Ok(Some(configuration.clone()))
    }

    async fn delete_webhook_configuration(&self, id: WebhookConfigurationId) -> Result<bool> {
        let Some((_, configuration)) = self.tables.webhook_configurations.remove(&id) else {
            return Ok(false);
        };
        self.tables.webhook_keys.remove(&configuration.webhook_key);
        // Logs cascade with their configuration
        self.tables.webhook_logs.retain(|_, log| log.webhook_configuration_id != id);
        Ok(true)
    }

    async fn touch_webhook_configuration(&self, id: WebhookConfigurationId) -> Result<()> {
        match self.tables.webhook_configurations.get_mut(&id) {
            Some(mut configuration) => {
                configuration.last_used_at = Some(Utc::now());
                Ok(())
            }
            None => Err(DbError::NotFound),
        }
    }

    async fn create_webhook_log(&self, request: &WebhookLogCreateDBRequest) -> Result<WebhookLog> {
        if !self
            .tables
            .webhook_configurations
            .contains_key(&request.webhook_configuration_id)
        {
            return Err(foreign_key_violation("webhook_logs", "webhook_configuration_id"));
        }
        let log = WebhookLog {
            id: Uuid::new_v4(),
            webhook_configuration_id: request.webhook_configuration_id,
            payload: request.payload.clone(),
            status: request.status.to_string(),
            error: request.error.clone(),
            ip_address: request.ip_address.clone(),
            user_agent: request.user_agent.clone(),
            created_at: Utc::now(),
        };
        self.tables.webhook_logs.insert(log.id, log.clone());
        Ok(log)
    }

    async fn list_webhook_logs(&self, webhook_configuration_id: WebhookConfigurationId) -> Result<Vec<WebhookLog>> {
        let mut logs = collect(&self.tables.webhook_logs, |l| {
            l.webhook_configuration_id == webhook_configuration_id
        });
        logs.sort_by_key(|l| (Reverse(l.created_at), l.id));
        Ok(logs)
    }

    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<User> {
        if let Some(creche_id) = request.creche_id {
            self.require_creche(creche_id, "users")?;
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: request.email.clone(),
            display_name: request.display_name.clone(),
            password_hash: request.password_hash.clone(),
            role: request.role.to_string(),
            creche_id: request.creche_id,
            created_at: now,
            updated_at: now,
        };
        match self.tables.user_emails.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => return Err(unique_violation("users", "email")),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.users.get(&id).map(|r| r.value().clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let id = self.tables.user_emails.get(&email.to_lowercase()).map(|r| *r.value());
        Ok(id.and_then(|id| self.tables.users.get(&id).map(|r| r.value().clone())))
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let mut users = collect(&self.tables.users, |u| filter.matches(u));
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn update_user(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<Option<User>> {
        let Some(mut user) = self.tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(display_name) = &request.display_name {
            user.display_name = Some(display_name.clone());
        }
        if let Some(password_hash) = &request.password_hash {
            user.password_hash = Some(password_hash.clone());
        }
        if let Some(role) = request.role {
            user.role = role.to_string();
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn create_event(&self, request: &EventCreateDBRequest) -> Result<Event> {
        self.require_creche(request.creche_id, "events")?;
        let event = Event {
            id: Uuid::new_v4(),
            creche_id: request.creche_id,
            title: request.title.clone(),
            description: request.description.clone(),
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            created_at: Utc::now(),
        };
        self.tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut events = collect(&self.tables.events, |e| filter.creche_id.is_none_or(|id| e.creche_id == id));
        events.sort_by_key(|e| (e.starts_at, e.id));
        Ok(events)
    }

    async fn create_notification(&self, request: &NotificationCreateDBRequest) -> Result<Notification> {
        if !self.tables.users.contains_key(&request.user_id) {
            return Err(foreign_key_violation("notifications", "user_id"));
        }
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            title: request.title.clone(),
            body: request.body.clone(),
            read: false,
            created_at: Utc::now(),
        };
        self.tables.notifications.insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_notifications(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let mut notifications = collect(&self.tables.notifications, |n| n.user_id == user_id);
        notifications.sort_by_key(|n| (Reverse(n.created_at), n.id));
        Ok(notifications)
    }

    async fn mark_notification_read(&self, id: NotificationId, user_id: UserId) -> Result<Option<Notification>> {
        match self.tables.notifications.get_mut(&id) {
            Some(mut notification) if notification.user_id == user_id => {
                notification.read = true;
                Ok(Some(notification.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApplicationStatus, Role, WebhookLogStatus};
    use std::collections::HashMap;

    async fn seed_creche(store: &InMemoryStore, name: &str, province: Option<&str>) -> Creche {
        store
            .create_creche(&CrecheCreateDBRequest {
                name: name.to_string(),
                province: province.map(str::to_string),
                capacity: Some(20),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    fn lead(creche_id: CrecheId, parent_name: &str) -> ApplicationCreateDBRequest {
        ApplicationCreateDBRequest {
            creche_id,
            parent_name: parent_name.to_string(),
            parent_email: None,
            parent_phone_number: "Unknown".to_string(),
            message: String::new(),
            status: ApplicationStatus::New,
            source: "webhook".to_string(),
        }
    }

    fn configuration(creche_id: CrecheId, key: &str) -> WebhookConfigurationCreateDBRequest {
        WebhookConfigurationCreateDBRequest {
            creche_id,
            name: "Website form".to_string(),
            webhook_key: key.to_string(),
            field_mapping: HashMap::new(),
            enabled: true,
        }
    }

    #[tokio::test]
    async fn test_identical_applications_are_not_deduplicated() {
        let store = InMemoryStore::new();
        let creche = seed_creche(&store, "Sunshine", Some("Gauteng")).await;

        let first = store.create_application(&lead(creche.id, "Thandi")).await.unwrap();
        let second = store.create_application(&lead(creche.id, "Thandi")).await.unwrap();

        assert_ne!(first.id, second.id);
        let all = store.list_applications(&ApplicationFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|a| a.status == "New"));
    }

    #[tokio::test]
    async fn test_application_requires_existing_creche() {
        let store = InMemoryStore::new();
        let err = store.create_application(&lead(Uuid::new_v4(), "Nobody")).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_webhook_key_is_unique_and_rotates() {
        let store = InMemoryStore::new();
        let creche = seed_creche(&store, "Sunshine", None).await;

        let config = store
            .create_webhook_configuration(&configuration(creche.id, "whk_one"))
            .await
            .unwrap();
        let duplicate = store
            .create_webhook_configuration(&configuration(creche.id, "whk_one"))
            .await
            .unwrap_err();
        assert!(matches!(duplicate, DbError::UniqueViolation { .. }));

        let rotated = store
            .update_webhook_configuration(
                config.id,
                &WebhookConfigurationUpdateDBRequest {
                    webhook_key: Some("whk_two".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rotated.webhook_key, "whk_two");
        assert!(store.find_webhook_configurations_by_key("whk_one").await.unwrap().is_empty());
        assert_eq!(store.find_webhook_configurations_by_key("whk_two").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_key_lookup_is_exact() {
        let store = InMemoryStore::new();
        let creche = seed_creche(&store, "Sunshine", None).await;
        store
            .create_webhook_configuration(&configuration(creche.id, "whk_Case"))
            .await
            .unwrap();

        assert!(store.find_webhook_configurations_by_key("whk_case").await.unwrap().is_empty());
        assert!(store.find_webhook_configurations_by_key("whk_Cas").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_configuration_cascades_logs() {
        let store = InMemoryStore::new();
        let creche = seed_creche(&store, "Sunshine", None).await;
        let config = store
            .create_webhook_configuration(&configuration(creche.id, "whk_logs"))
            .await
            .unwrap();
        store
            .create_webhook_log(&WebhookLogCreateDBRequest {
                webhook_configuration_id: config.id,
                payload: serde_json::json!({"name": "A"}),
                status: WebhookLogStatus::Success,
                error: None,
                ip_address: None,
                user_agent: None,
            })
            .await
            .unwrap();
        store.touch_webhook_configuration(config.id).await.unwrap();
        assert!(store.get_webhook_configuration(config.id).await.unwrap().unwrap().last_used_at.is_some());

        assert!(store.delete_webhook_configuration(config.id).await.unwrap());
        assert!(store.list_webhook_logs(config.id).await.unwrap().is_empty());
        assert!(!store.delete_webhook_configuration(config.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_filters_creches() {
        let store = InMemoryStore::new();
        seed_creche(&store, "Sunshine Creche", Some("Gauteng")).await;
        seed_creche(&store, "Little Stars", Some("Western Cape")).await;

        let found = store
            .list_creches(&CrecheFilter {
                search: Some("sunSHINE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Sunshine Creche");

        let by_province = store
            .list_creches(&CrecheFilter {
                province: Some("Western Cape".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_province.len(), 1);
    }

    #[tokio::test]
    async fn test_user_email_lookup_ignores_case() {
        let store = InMemoryStore::new();
        let user = store
            .create_user(&UserCreateDBRequest {
                email: "Admin@Example.org".to_string(),
                display_name: None,
                password_hash: None,
                role: Role::Admin,
                creche_id: None,
            })
            .await
            .unwrap();

        let found = store.get_user_by_email("admin@example.org").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.parsed_role(), Ok(Role::Admin));
    }

    #[tokio::test]
    async fn test_notifications_are_private_to_their_user() {
        let store = InMemoryStore::new();
        let owner = store
            .create_user(&UserCreateDBRequest {
                email: "owner@example.org".to_string(),
                display_name: None,
                password_hash: None,
                role: Role::Staff,
                creche_id: None,
            })
            .await
            .unwrap();
        let notification = store
            .create_notification(&NotificationCreateDBRequest {
                user_id: owner.id,
                title: "New lead".to_string(),
                body: "A parent enquired".to_string(),
            })
            .await
            .unwrap();

        assert!(store.mark_notification_read(notification.id, Uuid::new_v4()).await.unwrap().is_none());
        let read = store.mark_notification_read(notification.id, owner.id).await.unwrap().unwrap();
        assert!(read.read);
    }
}
