//! API models for disaster records and dashboard statistics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use super::pagination::Pagination;
use crate::{
    db::models::{
        assistance_records::{AssistanceRecordDBResponse, AssistanceStatus, AssistanceStatusTotal},
        evacuation_centers::{CenterStatus, CenterType, EvacuationCenterDBResponse, EvacuationCenterSummary},
        incidents::{IncidentDBResponse, IncidentStatus, IncidentSummary, SeverityLevel},
        system_settings::SystemSettingDBResponse,
    },
    types::{AccountId, AssistanceRecordId, EvacuationCenterId, IncidentId},
};

macro_rules! list_query {
    ($(#[$meta:meta])* $name:ident, $status:ty) => {
        $(#[$meta])*
        #[derive(Debug, Deserialize, IntoParams)]
        #[into_params(parameter_in = Query)]
        pub struct $name {
            #[serde(flatten)]
            #[param(inline)]
            pub pagination: Pagination,
            /// Only records in this status
            #[param(value_type = Option<String>)]
            pub status: Option<$status>,
        }
    };
}

list_query!(
    /// `?skip=&limit=&status=` for incidents
    ListIncidentsQuery,
    IncidentStatus
);
list_query!(ListEvacuationCentersQuery, CenterStatus);
list_query!(ListAssistanceRecordsQuery, AssistanceStatus);

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: IncidentId,
    pub incident_code: String,
    pub incident_type: String,
    pub incident_name: String,
    pub description: Option<String>,
    pub severity_level: SeverityLevel,
    pub status: IncidentStatus,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    pub coordinates: Option<Value>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub reported_by: Option<AccountId>,
    pub date_occurred: Option<DateTime<Utc>>,
    pub date_reported: DateTime<Utc>,
    pub date_resolved: Option<DateTime<Utc>>,
    pub affected_families: i32,
    pub affected_persons: i32,
    pub casualties: Value,
}

impl From<IncidentDBResponse> for IncidentResponse {
    fn from(db: IncidentDBResponse) -> Self {
        Self {
            id: db.id,
            incident_code: db.incident_code,
            incident_type: db.incident_type,
            incident_name: db.incident_name,
            description: db.description,
            severity_level: db.severity_level,
            status: db.status,
            region: db.region,
            province: db.province,
            city: db.city,
            barangay: db.barangay,
            coordinates: db.coordinates,
            reported_by: db.reported_by,
            date_occurred: db.date_occurred,
            date_reported: db.date_reported,
            date_resolved: db.date_resolved,
            affected_families: db.affected_families,
            affected_persons: db.affected_persons,
            casualties: db.casualties,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EvacuationCenterResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: EvacuationCenterId,
    pub center_name: String,
    pub center_type: CenterType,
    pub capacity: i32,
    pub current_occupancy: i32,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    pub complete_address: Option<String>,
    pub facilities: Value,
    pub contact_person: Option<String>,
    pub contact_number: Option<String>,
    pub status: CenterStatus,
    pub opened_date: Option<DateTime<Utc>>,
}

impl From<EvacuationCenterDBResponse> for EvacuationCenterResponse {
    fn from(db: EvacuationCenterDBResponse) -> Self {
        Self {
            id: db.id,
            center_name: db.center_name,
            center_type: db.center_type,
            capacity: db.capacity,
            current_occupancy: db.current_occupancy,
            region: db.region,
            province: db.province,
            city: db.city,
            barangay: db.barangay,
            complete_address: db.complete_address,
            facilities: db.facilities,
            contact_person: db.contact_person,
            contact_number: db.contact_number,
            status: db.status,
            opened_date: db.opened_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssistanceRecordResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AssistanceRecordId,
    pub record_code: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub incident_id: Option<IncidentId>,
    pub family_head_name: String,
    pub family_members: i32,
    pub assistance_type: String,
    pub assistance_details: Option<Value>,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub quantity: i32,
    pub distribution_date: Option<DateTime<Utc>>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    pub status: AssistanceStatus,
    pub remarks: Option<String>,
}

impl From<AssistanceRecordDBResponse> for AssistanceRecordResponse {
    fn from(db: AssistanceRecordDBResponse) -> Self {
        Self {
            id: db.id,
            record_code: db.record_code,
            incident_id: db.incident_id,
            family_head_name: db.family_head_name,
            family_members: db.family_members,
            assistance_type: db.assistance_type,
            assistance_details: db.assistance_details,
            amount: db.amount,
            quantity: db.quantity,
            distribution_date: db.distribution_date,
            region: db.region,
            province: db.province,
            city: db.city,
            barangay: db.barangay,
            status: db.status,
            remarks: db.remarks,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct IncidentStats {
    pub total: i64,
    pub active: i64,
    pub monitoring: i64,
    pub affected_families: i64,
    pub affected_persons: i64,
}

impl From<IncidentSummary> for IncidentStats {
    fn from(s: IncidentSummary) -> Self {
        Self {
            total: s.total,
            active: s.active,
            monitoring: s.monitoring,
            affected_families: s.affected_families,
            affected_persons: s.affected_persons,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EvacuationStats {
    pub total: i64,
    pub available: i64,
    pub full: i64,
    pub total_capacity: i64,
    pub current_occupancy: i64,
    /// Occupancy as a percentage of capacity, 0 when there is no capacity
    pub occupancy_rate: f64,
}

impl From<EvacuationCenterSummary> for EvacuationStats {
    fn from(s: EvacuationCenterSummary) -> Self {
        let occupancy_rate = if s.total_capacity > 0 {
            (s.current_occupancy as f64 / s.total_capacity as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
        Self {
            total: s.total,
            available: s.available,
            full: s.full,
            total_capacity: s.total_capacity,
            current_occupancy: s.current_occupancy,
            occupancy_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssistanceStatusStats {
    pub status: AssistanceStatus,
    pub records: i64,
    pub families_served: i64,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
}

impl From<AssistanceStatusTotal> for AssistanceStatusStats {
    fn from(t: AssistanceStatusTotal) -> Self {
        Self {
            status: t.status,
            records: t.records,
            families_served: t.families_served,
            total_amount: t.total_amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssistanceStats {
    pub total_records: i64,
    pub families_served: i64,
    /// Sum over every status except `Cancelled`
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub by_status: Vec<AssistanceStatusStats>,
}

impl AssistanceStats {
    pub fn from_totals(totals: Vec<AssistanceStatusTotal>) -> Self {
        let counted = || totals.iter().filter(|t| t.status != AssistanceStatus::Cancelled);
        Self {
            total_records: totals.iter().map(|t| t.records).sum(),
            families_served: counted().map(|t| t.families_served).sum(),
            total_amount: counted().map(|t| t.total_amount).sum(),
            by_status: totals.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsResponse {
    pub incidents: IncidentStats,
    pub evacuation_centers: EvacuationStats,
    pub assistance: AssistanceStats,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicSettingResponse {
    pub key: String,
    pub value: Value,
    pub description: Option<String>,
    pub category: String,
}

impl From<SystemSettingDBResponse> for PublicSettingResponse {
    fn from(db: SystemSettingDBResponse) -> Self {
        Self {
            key: db.setting_key,
            value: db.setting_value,
            description: db.description,
            category: db.category,
        }
    }
}
