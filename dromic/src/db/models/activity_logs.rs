//! Database models for the activity log.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use std::net::IpAddr;
use uuid::Uuid;

use crate::types::{AccountId, LogId, string_enum};

string_enum!(
    /// Outcome recorded with each activity.
    ActivityStatus {
        Success => "success",
        Failed => "failed",
        Error => "error",
    }
);

/// Database request for appending an activity
#[derive(Debug, Clone)]
pub struct ActivityLogCreateDBRequest {
    pub account_id: Option<AccountId>,
    pub activity_type: String,
    pub activity_category: String,
    pub target_table: Option<String>,
    pub target_id: Option<Uuid>,
    pub target_name: Option<String>,
    pub action_details: Option<Value>,
    pub before_state: Option<Value>,
    pub after_state: Option<Value>,
    pub ip_address: Option<IpAddr>,
    pub device_info: Option<String>,
    pub status: ActivityStatus,
    pub notes: Option<String>,
}

/// Filter for listing activities, newest first
#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    pub account_id: Option<AccountId>,
    pub activity_type: Option<String>,
    pub activity_category: Option<String>,
    /// Only entries newer than this many days; `None` disables the window
    pub within_days: Option<i32>,
    pub skip: i64,
    pub limit: i64,
}

/// Entries are never modified, so there is nothing to request.
#[derive(Debug, Clone)]
pub enum ActivityLogUpdateDBRequest {}

#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogDBResponse {
    pub log_id: LogId,
    pub account_id: Option<AccountId>,
    pub activity_type: String,
    pub activity_category: String,
    pub target_table: Option<String>,
    pub target_id: Option<Uuid>,
    pub target_name: Option<String>,
    pub action_details: Option<Value>,
    pub before_state: Option<Value>,
    pub after_state: Option<Value>,
    pub timestamp: DateTime<Utc>,
    /// Text form of the stored `INET`, selected with `host(ip_address)`
    pub ip_address: Option<String>,
    pub device_info: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ActivityStatus,
    pub notes: Option<String>,
}
