//! The `Store` trait: every read and write the service performs against persistent data.
//!
//! Two implementations exist: [`PostgresStore`](super::postgres::PostgresStore) for production
//! and [`InMemoryStore`](super::in_memory::InMemoryStore) for development and tests. Handlers only
//! ever see `Arc<dyn Store>`.
//!
//! Getters return `Ok(None)` for a missing row; updates return `Ok(None)` when the target does not
//! exist. Errors are reserved for storage failures and constraint violations.

use async_trait::async_trait;

use crate::db::errors::Result;
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
use crate::types::{
    ApplicationId, CrecheId, NotificationId, SupportTicketId, UserId, WebhookConfigurationId,
};

#[async_trait]
pub trait Store: Send + Sync {
    // Creches
    async fn create_creche(&self, request: &CrecheCreateDBRequest) -> Result<Creche>;
    async fn get_creche(&self, id: CrecheId) -> Result<Option<Creche>>;
    async fn list_creches(&self, filter: &CrecheFilter) -> Result<Vec<Creche>>;
    async fn update_creche(&self, id: CrecheId, request: &CrecheUpdateDBRequest) -> Result<Option<Creche>>;

    // Students
    async fn create_student(&self, request: &StudentCreateDBRequest) -> Result<Student>;
    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>>;

    // Applications
    /// Insert a lead. Inserts are not deduplicated: identical requests produce distinct rows.
    async fn create_application(&self, request: &ApplicationCreateDBRequest) -> Result<Application>;
    async fn get_application(&self, id: ApplicationId) -> Result<Option<Application>>;
    async fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>>;
    async fn update_application(
        &self,
        id: ApplicationId,
        request: &ApplicationUpdateDBRequest,
    ) -> Result<Option<Application>>;

    // Invoices
    async fn create_invoice(&self, request: &InvoiceCreateDBRequest) -> Result<Invoice>;
    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>>;

    // Support tickets
    async fn create_support_ticket(&self, request: &SupportTicketCreateDBRequest) -> Result<SupportTicket>;
    async fn get_support_ticket(&self, id: SupportTicketId) -> Result<Option<SupportTicket>>;
    async fn list_support_tickets(&self, filter: &SupportTicketFilter) -> Result<Vec<SupportTicket>>;
    async fn update_support_ticket(
        &self,
        id: SupportTicketId,
        request: &SupportTicketUpdateDBRequest,
    ) -> Result<Option<SupportTicket>>;

    // Webhook configurations and logs
    async fn create_webhook_configuration(
        &self,
        request: &WebhookConfigurationCreateDBRequest,
    ) -> Result<WebhookConfiguration>;
    async fn get_webhook_configuration(&self, id: WebhookConfigurationId) -> Result<Option<WebhookConfiguration>>;
    /// All configurations whose key equals `webhook_key` exactly.
    async fn find_webhook_configurations_by_key(&self, webhook_key: &str) -> Result<Vec<WebhookConfiguration>>;
    async fn list_webhook_configurations(&self, filter: &WebhookConfigurationFilter) -> Result<Vec<WebhookConfiguration>>;
    async fn update_webhook_configuration(
        &self,
        id: WebhookConfigurationId,
        request: &WebhookConfigurationUpdateDBRequest,
    ) -> Result<Option<WebhookConfiguration>>;
    async fn delete_webhook_configuration(&self, id: WebhookConfigurationId) -> Result<bool>;
    async fn touch_webhook_configuration(&self, id: WebhookConfigurationId) -> Result<()>;
    async fn create_webhook_log(&self, request: &WebhookLogCreateDBRequest) -> Result<WebhookLog>;
    async fn list_webhook_logs(&self, webhook_configuration_id: WebhookConfigurationId) -> Result<Vec<WebhookLog>>;

    // Users
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<User>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>>;
    async fn update_user(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<Option<User>>;

    // Events
    async fn create_event(&self, request: &EventCreateDBRequest) -> Result<Event>;
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    // Notifications
    async fn create_notification(&self, request: &NotificationCreateDBRequest) -> Result<Notification>;
    async fn list_notifications(&self, user_id: UserId) -> Result<Vec<Notification>>;
    /// Mark one of `user_id`'s notifications read. `None` if it does not exist or belongs to someone else.
    async fn mark_notification_read(&self, id: NotificationId, user_id: UserId) -> Result<Option<Notification>>;
}
