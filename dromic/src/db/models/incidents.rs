//! Database models for disaster incidents.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

use crate::types::{AccountId, IncidentId, string_enum};

string_enum!(SeverityLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

string_enum!(IncidentStatus {
    Active => "Active",
    Resolved => "Resolved",
    Monitoring => "Monitoring",
    Closed => "Closed",
});

#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub status: Option<IncidentStatus>,
    pub skip: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct IncidentDBResponse {
    pub id: IncidentId,
    pub incident_code: String,
    pub incident_type: String,
    pub incident_name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub severity_level: SeverityLevel,
    #[sqlx(try_from = "String")]
    pub status: IncidentStatus,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    pub coordinates: Option<Value>,
    pub reported_by: Option<AccountId>,
    pub assigned_to: Option<AccountId>,
    pub date_occurred: Option<DateTime<Utc>>,
    pub date_reported: DateTime<Utc>,
    pub date_resolved: Option<DateTime<Utc>>,
    pub affected_families: i32,
    pub affected_persons: i32,
    pub casualties: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregates over incidents that are not closed
#[derive(Debug, Clone, Default, FromRow)]
pub struct IncidentSummary {
    pub total: i64,
    pub active: i64,
    pub monitoring: i64,
    pub affected_families: i64,
    pub affected_persons: i64,
}
