//! API models for the caller's activity feed and notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::{
    db::models::{
        activity_logs::{ActivityLogDBResponse, ActivityStatus},
        notifications::{NotificationDBResponse, NotificationPriority},
    },
    types::{LogId, NotificationId},
};

/// Days of history returned when `days` is not given.
pub const DEFAULT_ACTIVITY_DAYS: i32 = 30;

#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ActivityQuery {
    /// Page number, starting at 1
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page: Option<i64>,
    /// Entries per page (default 10, max 100)
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
    pub activity_type: Option<String>,
    pub activity_category: Option<String>,
    /// Look-back window in days (default 30); zero or negative returns everything
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub days: Option<i32>,
}

impl ActivityQuery {
    /// The time window to apply, if any.
    pub fn within_days(&self) -> Option<i32> {
        Some(self.days.unwrap_or(DEFAULT_ACTIVITY_DAYS)).filter(|d| *d > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponse {
    #[schema(value_type = String, format = "uuid")]
    pub log_id: LogId,
    pub activity_type: String,
    pub activity_category: String,
    pub target_table: Option<String>,
    pub target_name: Option<String>,
    pub action_details: Option<Value>,
    pub before_state: Option<Value>,
    pub after_state: Option<Value>,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub device_info: Option<String>,
    pub status: ActivityStatus,
    pub notes: Option<String>,
}

impl From<ActivityLogDBResponse> for ActivityResponse {
    fn from(db: ActivityLogDBResponse) -> Self {
        Self {
            log_id: db.log_id,
            activity_type: db.activity_type,
            activity_category: db.activity_category,
            target_table: db.target_table,
            target_name: db.target_name,
            action_details: db.action_details,
            before_state: db.before_state,
            after_state: db.after_state,
            timestamp: db.timestamp,
            ip_address: db.ip_address,
            device_info: db.device_info,
            status: db.status,
            notes: db.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityListResponse {
    pub activities: Vec<ActivityResponse>,
    pub has_more: bool,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct NotificationQuery {
    /// Only unread notifications
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub unread: Option<bool>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: NotificationId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: Option<Value>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub priority: NotificationPriority,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationDBResponse> for NotificationResponse {
    fn from(db: NotificationDBResponse) -> Self {
        Self {
            id: db.id,
            notification_type: db.notification_type,
            title: db.title,
            message: db.message,
            data: db.data,
            is_read: db.is_read,
            read_at: db.read_at,
            priority: db.priority,
            expires_at: db.expires_at,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_window() {
        let q = ActivityQuery::default();
        assert_eq!(q.within_days(), Some(30));

        let q = ActivityQuery {
            days: Some(0),
            ..Default::default()
        };
        assert_eq!(q.within_days(), None);

        let q = ActivityQuery {
            days: Some(-3),
            ..Default::default()
        };
        assert_eq!(q.within_days(), None);
    }

    #[test]
    fn test_activity_query_from_string() {
        let uri: axum::http::Uri = "/?page=2&limit=5&days=7&activity_category=session".parse().unwrap();
        let q = axum::extract::Query::<ActivityQuery>::try_from_uri(&uri).unwrap().0;
        assert_eq!(q.page, Some(2));
        assert_eq!(q.within_days(), Some(7));
        assert_eq!(q.activity_category.as_deref(), Some("session"));
    }
}
