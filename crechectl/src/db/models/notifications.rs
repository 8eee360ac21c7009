//! Database models for in-app notifications.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{NotificationId, UserId};

#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NotificationCreateDBRequest {
    pub user_id: UserId,
    pub title: String,
    pub body: String,
}
