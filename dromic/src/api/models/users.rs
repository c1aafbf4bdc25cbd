//! API request/response models for accounts and profiles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::models::{
        accounts::{AccountDBResponse, AccountStatus},
        profiles::ProfileDBResponse,
        user_levels::UserLevelDBResponse,
    },
    types::{AccountId, SessionId, UserLevelId},
};

/// The authenticated caller, as carried in the session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: AccountId,
    pub email: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub user_level_id: Option<UserLevelId>,
    pub position: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub session_id: SessionId,
}

impl CurrentUser {
    /// A fresh session for an account; every login mints a new session id.
    pub fn new_session(account: &AccountDBResponse, level: Option<&UserLevelDBResponse>) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            user_level_id: account.user_level_id,
            position: level.map(|l| l.position.clone()),
            session_id: uuid::Uuid::new_v4(),
        }
    }
}

/// Compact user returned by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[schema(value_type = String, format = "uuid")]
    pub id: AccountId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: Option<String>,
    pub position: Option<String>,
    pub abbreviation: Option<String>,
}

impl UserSummary {
    pub fn new(account: &AccountDBResponse, profile: &ProfileDBResponse, level: Option<&UserLevelDBResponse>) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            username: account.username.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            image_url: profile.image_url.clone(),
            position: level.map(|l| l.position.clone()),
            abbreviation: level.map(|l| l.abbreviation.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub name_extension: Option<String>,
    pub image_url: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub job_title: Option<String>,
    pub division: Option<String>,
}

impl From<ProfileDBResponse> for ProfileResponse {
    fn from(db: ProfileDBResponse) -> Self {
        Self {
            first_name: db.first_name,
            last_name: db.last_name,
            middle_name: db.middle_name,
            name_extension: db.name_extension,
            image_url: db.image_url,
            region: db.region,
            province: db.province,
            city: db.city,
            barangay: db.barangay,
            date_of_birth: db.date_of_birth,
            phone_number: db.phone_number,
            address: db.address,
            job_title: db.job_title,
            division: db.division,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserLevelResponse {
    pub position: String,
    pub abbreviation: String,
    /// Numeric rank; higher is more senior
    pub level: i32,
}

impl From<UserLevelDBResponse> for UserLevelResponse {
    fn from(db: UserLevelDBResponse) -> Self {
        Self {
            position: db.position,
            abbreviation: db.abbreviation,
            level: db.rank,
        }
    }
}

/// Full account view returned by `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub status: AccountStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub last_password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub profile: ProfileResponse,
    pub user_level: Option<UserLevelResponse>,
}

impl UserResponse {
    pub fn new(account: AccountDBResponse, profile: ProfileDBResponse, level: Option<UserLevelDBResponse>) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            status: account.status,
            last_login: account.last_login,
            last_password_changed_at: account.last_password_changed_at,
            created_at: account.created_at,
            profile: profile.into(),
            user_level: level.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: UserResponse,
}

/// Body of `PATCH /api/user/profile`.
///
/// `updateType` selects which group of fields is applied; the remaining fields are
/// validated for that group only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// `profile` or `account`
    pub update_type: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub name_extension: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub job_title: Option<String>,
    pub division: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
