//! PostgreSQL store implementation.
//!
//! Queries are built at runtime with `sqlx::query_as::<_, T>` and `QueryBuilder` so list filters
//! compose without string concatenation of user input. Every value is bound.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use tracing::instrument;

use crate::db::errors::Result;
use crate::db::models::{
    applications::{Application, ApplicationCreateDBRequest, ApplicationFilter, ApplicationUpdateDBRequest},
    creches::{Creche, CrecheCreateDBRequest, CrecheFilter, CrecheUpdateDBRequest},
    events::{Event, EventCreateDBRequest, EventFilter},
    invoices::{Invoice, InvoiceCreateDBRequest, InvoiceFilter},
    like_pattern,
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
    ApplicationId, CrecheId, NotificationId, SupportTicketId, UserId, WebhookConfigurationId, abbrev_uuid,
};

/// PostgreSQL store backed by a connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Append `AND (LOWER(a) LIKE $n ESCAPE '\' OR ...)` when a search term is present.
fn push_search(query: &mut QueryBuilder<'_, Postgres>, search: Option<&str>, columns: &[&str]) {
    let Some(pattern) = like_pattern(search) else {
        return;
    };
    query.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            query.push(" OR ");
        }
        query.push(format!("LOWER(COALESCE({column}, '')) LIKE "));
        query.push_bind(pattern.clone());
        query.push(r" ESCAPE '\'");
    }
    query.push(")");
}

#[async_trait]
impl Store for PostgresStore {
    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create_creche(&self, request: &CrecheCreateDBRequest) -> Result<Creche> {
        let creche = sqlx::query_as::<_, Creche>(
            r#"
            INSERT INTO creches (name, province, address, phone_number, email, capacity,
                                 price_monthly, price_weekly, registered, features)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.province)
        .bind(&request.address)
        .bind(&request.phone_number)
        .bind(&request.email)
        .bind(request.capacity)
        .bind(request.price_monthly)
        .bind(request.price_weekly)
        .bind(request.registered)
        .bind(Json(&request.features))
        .fetch_one(&self.pool)
        .await?;
        Ok(creche)
    }

    #[instrument(skip(self), fields(creche_id = %abbrev_uuid(&id)), err)]
    async fn get_creche(&self, id: CrecheId) -> Result<Option<Creche>> {
        let creche = sqlx::query_as::<_, Creche>("SELECT * FROM creches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(creche)
    }

    #[instrument(skip(self, filter), err)]
    async fn list_creches(&self, filter: &CrecheFilter) -> Result<Vec<Creche>> {
        let mut query = QueryBuilder::new("SELECT * FROM creches WHERE TRUE");
        if let Some(id) = filter.id {
            query.push(" AND id = ").push_bind(id);
        }
        if let Some(province) = &filter.province {
            query.push(" AND province = ").push_bind(province.clone());
        }
        push_search(&mut query, filter.search.as_deref(), &["name", "province", "address", "email"]);
        query.push(" ORDER BY name, id");

        let creches = query.build_query_as::<Creche>().fetch_all(&self.pool).await?;
        Ok(creches)
    }

    #[instrument(skip(self, request), fields(creche_id = %abbrev_uuid(&id)), err)]
    async fn update_creche(&self, id: CrecheId, request: &CrecheUpdateDBRequest) -> Result<Option<Creche>> {
        let creche = sqlx::query_as::<_, Creche>(
            r#"
            UPDATE creches SET
                name = COALESCE($2, name),
                province = CASE WHEN $3 THEN $4 ELSE province END,
                address = CASE WHEN $5 THEN $6 ELSE address END,
                phone_number = CASE WHEN $7 THEN $8 ELSE phone_number END,
                email = CASE WHEN $9 THEN $10 ELSE email END,
                capacity = CASE WHEN $11 THEN $12 ELSE capacity END,
                price_monthly = CASE WHEN $13 THEN $14 ELSE price_monthly END,
                price_weekly = CASE WHEN $15 THEN $16 ELSE price_weekly END,
                registered = COALESCE($17, registered),
                features = COALESCE($18, features),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.province.is_some())
        .bind(request.province.clone().flatten())
        .bind(request.address.is_some())
        .bind(request.address.clone().flatten())
        .bind(request.phone_number.is_some())
        .bind(request.phone_number.clone().flatten())
        .bind(request.email.is_some())
        .bind(request.email.clone().flatten())
        .bind(request.capacity.is_some())
        .bind(request.capacity.flatten())
        .bind(request.price_monthly.is_some())
        .bind(request.price_monthly.flatten())
        .bind(request.price_weekly.is_some())
        .bind(request.price_weekly.flatten())
        .bind(request.registered)
        .bind(request.features.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await?;
        Ok(creche)
    }

    #[instrument(skip(self, request), fields(creche_id = %abbrev_uuid(&request.creche_id)), err)]
    async fn create_student(&self, request: &StudentCreateDBRequest) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (creche_id, first_name, last_name, date_of_birth,
                                  parent_name, parent_phone_number, enrolled)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.creche_id)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.date_of_birth)
        .bind(&request.parent_name)
        .bind(&request.parent_phone_number)
        .bind(request.enrolled)
        .fetch_one(&self.pool)
        .await?;
        Ok(student)
    }

    #[instrument(skip(self, filter), err)]
    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        let mut query = QueryBuilder::new("SELECT * FROM students WHERE TRUE");
        if let Some(creche_id) = filter.creche_id {
            query.push(" AND creche_id = ").push_bind(creche_id);
        }
        push_search(&mut query, filter.search.as_deref(), &["first_name", "last_name", "parent_name"]);
        query.push(" ORDER BY last_name, first_name, id");

        let students = query.build_query_as::<Student>().fetch_all(&self.pool).await?;
        Ok(students)
    }

    #[instrument(skip(self, request), fields(creche_id = %abbrev_uuid(&request.creche_id), source = %request.source), err)]
    async fn create_application(&self, request: &ApplicationCreateDBRequest) -> Result<Application> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (creche_id, parent_name, parent_email, parent_phone_number,
                                      message, status, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.creche_id)
        .bind(&request.parent_name)
        .bind(&request.parent_email)
        .bind(&request.parent_phone_number)
        .bind(&request.message)
        .bind(request.status.as_str())
        .bind(&request.source)
        .fetch_one(&self.pool)
        .await?;
        Ok(application)
    }

    #[instrument(skip(self), fields(application_id = %abbrev_uuid(&id)), err)]
    async fn get_application(&self, id: ApplicationId) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(application)
    }

    #[instrument(skip(self, filter), err)]
    async fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>> {
        let mut query = QueryBuilder::new("SELECT * FROM applications WHERE TRUE");
        if let Some(creche_id) = filter.creche_id {
            query.push(" AND creche_id = ").push_bind(creche_id);
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ").push_bind(status.clone());
        }
        push_search(
            &mut query,
            filter.search.as_deref(),
            &["parent_name", "parent_email", "parent_phone_number", "message"],
        );
        query.push(" ORDER BY created_at DESC, id");

        let applications = query.build_query_as::<Application>().fetch_all(&self.pool).await?;
        Ok(applications)
    }

    #[instrument(skip(self, request), fields(application_id = %abbrev_uuid(&id)), err)]
    async fn update_application(
        &self,
        id: ApplicationId,
        request: &ApplicationUpdateDBRequest,
    ) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications SET
                status = COALESCE($2, status),
                message = COALESCE($3, message),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.status.map(|s| s.as_str()))
        .bind(&request.message)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }

    #[instrument(skip(self, request), fields(creche_id = %abbrev_uuid(&request.creche_id)), err)]
    async fn create_invoice(&self, request: &InvoiceCreateDBRequest) -> Result<Invoice> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (creche_id, student_id, total_amount, status, issued_at, due_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.creche_id)
        .bind(request.student_id)
        .bind(request.total_amount)
        .bind(request.status.as_str())
        .bind(request.issued_at)
        .bind(request.due_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(invoice)
    }

    #[instrument(skip(self, filter), err)]
    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        let mut query = QueryBuilder::new("SELECT * FROM invoices WHERE TRUE");
        if let Some(creche_id) = filter.creche_id {
            query.push(" AND creche_id = ").push_bind(creche_id);
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ").push_bind(status.clone());
        }
        query.push(" ORDER BY issued_at DESC, id");

        let invoices = query.build_query_as::<Invoice>().fetch_all(&self.pool).await?;
        Ok(invoices)
    }

    #[instrument(skip(self, request), err)]
    async fn create_support_ticket(&self, request: &SupportTicketCreateDBRequest) -> Result<SupportTicket> {
        let ticket = sqlx::query_as::<_, SupportTicket>(
            r#"
            INSERT INTO support_tickets (creche_id, user_id, subject, description, priority, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.creche_id)
        .bind(request.user_id)
        .bind(&request.subject)
        .bind(&request.description)
        .bind(request.priority.as_str())
        .bind(request.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(ticket)
    }

    #[instrument(skip(self), fields(ticket_id = %abbrev_uuid(&id)), err)]
    async fn get_support_ticket(&self, id: SupportTicketId) -> Result<Option<SupportTicket>> {
        let ticket = sqlx::query_as::<_, SupportTicket>("SELECT * FROM support_tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    #[instrument(skip(self, filter), err)]
    async fn list_support_tickets(&self, filter: &SupportTicketFilter) -> Result<Vec<SupportTicket>> {
        let mut query = QueryBuilder::new("SELECT * FROM support_tickets WHERE TRUE");
        if let Some(creche_id) = filter.creche_id {
            query.push(" AND creche_id = ").push_bind(creche_id);
        }
        if let Some(priority) = &filter.priority {
            query.push(" AND priority = ").push_bind(priority.clone());
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ").push_bind(status.clone());
        }
        push_search(&mut query, filter.search.as_deref(), &["subject", "description"]);
        query.push(" ORDER BY created_at DESC, id");

        let tickets = query.build_query_as::<SupportTicket>().fetch_all(&self.pool).await?;
        Ok(tickets)
    }

    #[instrument(skip(self, request), fields(ticket_id = %abbrev_uuid(&id)), err)]
    async fn update_support_ticket(
        &self,
        id: SupportTicketId,
        request: &SupportTicketUpdateDBRequest,
    ) -> Result<Option<SupportTicket>> {
        let ticket = sqlx::query_as::<_, SupportTicket>(
            r#"
            UPDATE support_tickets SET
                priority = COALESCE($2, priority),
                status = COALESCE($3, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.priority.map(|p| p.as_str()))
        .bind(request.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(ticket)
    }

    #[instrument(skip(self, request), fields(creche_id = %abbrev_uuid(&request.creche_id)), err)]
    async fn create_webhook_configuration(
        &self,
        request: &WebhookConfigurationCreateDBRequest,
    ) -> Result<WebhookConfiguration> {
        let configuration = sqlx::query_as::<_, WebhookConfiguration>(
            r#"
            INSERT INTO webhook_configurations (creche_id, name, webhook_key, field_mapping, enabled)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.creche_id)
        .bind(&request.name)
        .bind(&request.webhook_key)
        .bind(Json(&request.field_mapping))
        .bind(request.enabled)
        .fetch_one(&self.pool)
        .await?;
        Ok(configuration)
    }

    #[instrument(skip(self), fields(webhook_configuration_id = %abbrev_uuid(&id)), err)]
    async fn get_webhook_configuration(&self, id: WebhookConfigurationId) -> Result<Option<WebhookConfiguration>> {
        let configuration =
            sqlx::query_as::<_, WebhookConfiguration>("SELECT * FROM webhook_configurations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(configuration)
    }

    // The key is a credential; keep it out of spans
    #[instrument(skip_all, err)]
    async fn find_webhook_configurations_by_key(&self, webhook_key: &str) -> Result<Vec<WebhookConfiguration>> {
        let configurations =
            sqlx::query_as::<_, WebhookConfiguration>("SELECT * FROM webhook_configurations WHERE webhook_key = $1")
                .bind(webhook_key)
                .fetch_all(&self.pool)
                .await?;
        Ok(configurations)
    }

    #[instrument(skip(self, filter), err)]
    async fn list_webhook_configurations(&self, filter: &WebhookConfigurationFilter) -> Result<Vec<WebhookConfiguration>> {
        let mut query = QueryBuilder::new("SELECT * FROM webhook_configurations WHERE TRUE");
        if let Some(creche_id) = filter.creche_id {
            query.push(" AND creche_id = ").push_bind(creche_id);
        }
        query.push(" ORDER BY created_at DESC, id");

        let configurations = query
            .build_query_as::<WebhookConfiguration>()
            .fetch_all(&self.pool)
            .await?;
        Ok(configurations)
    }

    #[instrument(skip(self, request), fields(webhook_configuration_id = %abbrev_uuid(&id)), err)]
    async fn update_webhook_configuration(
        &self,
        id: WebhookConfigurationId,
        request: &WebhookConfigurationUpdateDBRequest,
    ) -> Result<Option<WebhookConfiguration>> {
        let configuration = sqlx::query_as::<_, WebhookConfiguration>(
            r#"
            UPDATE webhook_configurations SET
                name = COALESCE($2, name),
                field_mapping = COALESCE($3, field_mapping),
                enabled = COALESCE($4, enabled),
                webhook_key = COALESCE($5, webhook_key),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.field_mapping.as_ref().map(Json))
        .bind(request.enabled)
        .bind(&request.webhook_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(configuration)
    }

    #[instrument(skip(self), fields(webhook_configuration_id = %abbrev_uuid(&id)), err)]
    async fn delete_webhook_configuration(&self, id: WebhookConfigurationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM webhook_configurations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(webhook_configuration_id = %abbrev_uuid(&id)), err)]
    async fn touch_webhook_configuration(&self, id: WebhookConfigurationId) -> Result<()> {
        let result = sqlx::query("UPDATE webhook_configurations SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(crate::db::errors::DbError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(webhook_configuration_id = %abbrev_uuid(&request.webhook_configuration_id), status = %request.status), err)]
    async fn create_webhook_log(&self, request: &WebhookLogCreateDBRequest) -> Result<WebhookLog> {
        let log = sqlx::query_as::<_, WebhookLog>(
            r#"
            INSERT INTO webhook_logs (webhook_configuration_id, payload, status, error, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.webhook_configuration_id)
        .bind(&request.payload)
        .bind(request.status.as_str())
        .bind(&request.error)
        .bind(&request.ip_address)
        .bind(&request.user_agent)
        .fetch_one(&self.pool)
        .await?;
        Ok(log)
    }

    #[instrument(skip(self), fields(webhook_configuration_id = %abbrev_uuid(&webhook_configuration_id)), err)]
    async fn list_webhook_logs(&self, webhook_configuration_id: WebhookConfigurationId) -> Result<Vec<WebhookLog>> {
        let logs = sqlx::query_as::<_, WebhookLog>(
            "SELECT * FROM webhook_logs WHERE webhook_configuration_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(webhook_configuration_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role), err)]
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, display_name, password_hash, role, creche_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.email)
        .bind(&request.display_name)
        .bind(&request.password_hash)
        .bind(request.role.as_str())
        .bind(request.creche_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self, filter), err)]
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let mut query = QueryBuilder::new("SELECT * FROM users WHERE TRUE");
        push_search(&mut query, filter.search.as_deref(), &["email", "display_name"]);
        query.push(" ORDER BY email");

        let users = query.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update_user(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                display_name = COALESCE($2, display_name),
                password_hash = COALESCE($3, password_hash),
                role = COALESCE($4, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.display_name)
        .bind(&request.password_hash)
        .bind(request.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, request), fields(creche_id = %abbrev_uuid(&request.creche_id)), err)]
    async fn create_event(&self, request: &EventCreateDBRequest) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (creche_id, title, description, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.creche_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    #[instrument(skip(self, filter), err)]
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut query = QueryBuilder::new("SELECT * FROM events WHERE TRUE");
        if let Some(creche_id) = filter.creche_id {
            query.push(" AND creche_id = ").push_bind(creche_id);
        }
        query.push(" ORDER BY starts_at, id");

        let events = query.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create_notification(&self, request: &NotificationCreateDBRequest) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, title, body) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(request.user_id)
        .bind(&request.title)
        .bind(&request.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    async fn list_notifications(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    #[instrument(skip(self), fields(notification_id = %abbrev_uuid(&id)), err)]
    async fn mark_notification_read(&self, id: NotificationId, user_id: UserId) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(notification)
    }
}
