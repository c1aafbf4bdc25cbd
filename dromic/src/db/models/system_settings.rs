//! Database models for system settings.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SystemSettingUpsertDBRequest {
    pub setting_key: String,
    pub setting_value: Value,
    pub description: Option<String>,
    pub category: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct SystemSettingDBResponse {
    pub id: Uuid,
    pub setting_key: String,
    pub setting_value: Value,
    pub description: Option<String>,
    pub category: String,
    pub is_public: bool,
    pub updated_at: DateTime<Utc>,
}
