//! Database models for user levels (positions).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{UserLevelId, string_enum};

string_enum!(UserLevelStatus {
    Active => "Active",
    Inactive => "Inactive",
});

/// Insert-or-update request keyed by `position`
#[derive(Debug, Clone)]
pub struct UserLevelUpsertDBRequest {
    pub position: String,
    pub abbreviation: String,
    pub rank: i32,
    pub permissions: serde_json::Value,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserLevelDBResponse {
    pub id: UserLevelId,
    pub position: String,
    pub abbreviation: String,
    pub rank: i32,
    pub permissions: serde_json::Value,
    #[sqlx(try_from = "String")]
    pub status: UserLevelStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
