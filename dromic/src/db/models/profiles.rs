//! Database models for personal profiles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{ProfileId, string_enum};

string_enum!(ProfileStatus {
    Active => "Active",
    Inactive => "Inactive",
    Suspended => "Suspended",
});

/// Personal and location attributes written on registration and profile edits.
///
/// Serializable so the audit log can snapshot it before and after an edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileFields {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub name_extension: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub job_title: Option<String>,
    pub division: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
}

/// Database request for creating a new profile
pub type ProfileCreateDBRequest = ProfileFields;

/// Database request for updating a profile; replaces every personal field
pub type ProfileUpdateDBRequest = ProfileFields;

#[derive(Debug, Clone, Default)]
pub struct ProfileFilter {
    pub region: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

/// Database response for a profile
#[derive(Debug, Clone, FromRow)]
pub struct ProfileDBResponse {
    pub id: ProfileId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub name_extension: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub job_title: Option<String>,
    pub division: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    pub image_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileDBResponse {
    /// The editable fields, as snapshotted in the audit log.
    pub fn fields(&self) -> ProfileFields {
        ProfileFields {
            first_name: self.first_name.clone(),
            middle_name: self.middle_name.clone(),
            last_name: self.last_name.clone(),
            name_extension: self.name_extension.clone(),
            date_of_birth: self.date_of_birth,
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            job_title: self.job_title.clone(),
            division: self.division.clone(),
            region: self.region.clone(),
            province: self.province.clone(),
            city: self.city.clone(),
            barangay: self.barangay.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
