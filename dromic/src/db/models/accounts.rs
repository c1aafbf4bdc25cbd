//! Database models for login accounts.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{AccountId, ProfileId, UserLevelId, string_enum};

string_enum!(
    /// Account status; only `Active` accounts may log in.
    AccountStatus {
        Active => "Active",
        Inactive => "Inactive",
        Suspended => "Suspended",
        Locked => "Locked",
    }
);

/// Database request for creating a new account
#[derive(Debug, Clone)]
pub struct AccountCreateDBRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub profile_id: ProfileId,
    pub user_level_id: Option<UserLevelId>,
    pub email_verified: bool,
    pub terms_accepted: bool,
    pub privacy_policy_accepted: bool,
}

/// Database request for changing an account's login identity
#[derive(Debug, Clone)]
pub struct AccountUpdateDBRequest {
    pub username: String,
    pub email: String,
}

/// Filter for listing accounts
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub status: Option<AccountStatus>,
    pub user_level_id: Option<UserLevelId>,
    pub skip: i64,
    pub limit: i64,
}

/// Database response for an account
#[derive(Debug, Clone, FromRow)]
pub struct AccountDBResponse {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
    pub profile_id: ProfileId,
    pub user_level_id: Option<UserLevelId>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_password_changed_at: Option<DateTime<Utc>>,
    pub failed_login_attempts: i32,
    pub account_locked_until: Option<DateTime<Utc>>,
    pub email_verified: bool,
    pub terms_accepted: bool,
    pub privacy_policy_accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counter state written by a failed login
#[derive(Debug, Clone, Copy, FromRow)]
pub struct FailedLoginUpdate {
    pub failed_login_attempts: i32,
    pub account_locked_until: Option<DateTime<Utc>>,
}
