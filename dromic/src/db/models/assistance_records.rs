//! Database models for relief assistance records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::FromRow;

use crate::types::{AccountId, AssistanceRecordId, IncidentId, string_enum};

string_enum!(AssistanceStatus {
    Pending => "Pending",
    Approved => "Approved",
    Distributed => "Distributed",
    Completed => "Completed",
    Cancelled => "Cancelled",
});

#[derive(Debug, Clone, Default)]
pub struct AssistanceRecordFilter {
    pub status: Option<AssistanceStatus>,
    pub incident_id: Option<IncidentId>,
    pub skip: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct AssistanceRecordDBResponse {
    pub id: AssistanceRecordId,
    pub record_code: String,
    pub incident_id: Option<IncidentId>,
    pub family_head_name: String,
    pub family_members: i32,
    pub assistance_type: String,
    pub assistance_details: Option<Value>,
    pub amount: Decimal,
    pub quantity: i32,
    pub distribution_date: Option<DateTime<Utc>>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    pub beneficiary_address: Option<String>,
    pub distributed_by: Option<AccountId>,
    pub verified_by: Option<AccountId>,
    #[sqlx(try_from = "String")]
    pub status: AssistanceStatus,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record count and amount per status
#[derive(Debug, Clone, FromRow)]
pub struct AssistanceStatusTotal {
    #[sqlx(try_from = "String")]
    pub status: AssistanceStatus,
    pub records: i64,
    pub families_served: i64,
    pub total_amount: Decimal,
}
