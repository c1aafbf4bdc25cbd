//! Database models for evacuation centers.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

use crate::types::{AccountId, EvacuationCenterId, string_enum};

string_enum!(CenterType {
    School => "School",
    BarangayHall => "Barangay Hall",
    Church => "Church",
    Gymnasium => "Gymnasium",
    Other => "Other",
});

string_enum!(CenterStatus {
    Available => "Available",
    Full => "Full",
    Unavailable => "Unavailable",
    Maintenance => "Maintenance",
});

#[derive(Debug, Clone, Default)]
pub struct EvacuationCenterFilter {
    pub status: Option<CenterStatus>,
    pub skip: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EvacuationCenterDBResponse {
    pub id: EvacuationCenterId,
    pub center_name: String,
    #[sqlx(try_from = "String")]
    pub center_type: CenterType,
    pub capacity: i32,
    pub current_occupancy: i32,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    pub complete_address: Option<String>,
    pub coordinates: Option<Value>,
    pub facilities: Value,
    pub contact_person: Option<String>,
    pub contact_number: Option<String>,
    pub managed_by: Option<AccountId>,
    #[sqlx(try_from = "String")]
    pub status: CenterStatus,
    pub opened_date: Option<DateTime<Utc>>,
    pub closed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct EvacuationCenterSummary {
    pub total: i64,
    pub available: i64,
    pub full: i64,
    pub total_capacity: i64,
    pub current_occupancy: i64,
}
