//! Database models for per-account notifications.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

use crate::types::{AccountId, NotificationId, string_enum};

string_enum!(NotificationPriority {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

#[derive(Debug, Clone)]
pub struct NotificationCreateDBRequest {
    pub recipient_id: AccountId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: Option<Value>,
    pub priority: NotificationPriority,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationDBResponse {
    pub id: NotificationId,
    pub recipient_id: AccountId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: Option<Value>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    #[sqlx(try_from = "String")]
    pub priority: NotificationPriority,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
