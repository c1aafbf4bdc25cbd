//! Database repository for login accounts.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use std::time::Duration;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::accounts::{
            AccountCreateDBRequest, AccountDBResponse, AccountFilter, AccountStatus, AccountUpdateDBRequest, FailedLoginUpdate,
        },
    },
    types::{AccountId, abbrev_uuid},
};

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, status, profile_id, user_level_id, last_login, \
     last_password_changed_at, failed_login_attempts, account_locked_until, email_verified, terms_accepted, \
     privacy_policy_accepted, created_at, updated_at";

pub struct Accounts<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Accounts<'c> {
    type CreateRequest = AccountCreateDBRequest;
    type UpdateRequest = AccountUpdateDBRequest;
    type Response = AccountDBResponse;
    type Id = AccountId;
    type Filter = AccountFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            "INSERT INTO account (username, email, password_hash, status, profile_id, user_level_id, email_verified, \
             terms_accepted, privacy_policy_accepted) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {ACCOUNT_COLUMNS}"
        );
        let account = sqlx::query_as::<_, AccountDBResponse>(&sql)
            .bind(&request.username)
            .bind(&request.email)
            .bind(&request.password_hash)
            .bind(request.status.as_str())
            .bind(request.profile_id)
            .bind(request.user_level_id)
            .bind(request.email_verified)
            .bind(request.terms_accepted)
            .bind(request.privacy_policy_accepted)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(account)
    }

    #[instrument(skip(self), fields(account_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = $1");
        let account = sqlx::query_as::<_, AccountDBResponse>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(account)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account \
             WHERE ($1::text IS NULL OR status = $1) AND ($2::uuid IS NULL OR user_level_id = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        let accounts = sqlx::query_as::<_, AccountDBResponse>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.user_level_id)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(accounts)
    }

    #[instrument(skip(self), fields(account_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM account WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(account_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!("UPDATE account SET username = $2, email = $3 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}");
        let account = sqlx::query_as::<_, AccountDBResponse>(&sql)
            .bind(id)
            .bind(&request.username)
            .bind(&request.email)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(account)
    }
}

impl<'c> Accounts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Look up an account by email or username, as typed into the login form.
    #[instrument(skip(self, identifier), err)]
    pub async fn get_by_login_identifier(&mut self, identifier: &str) -> Result<Option<AccountDBResponse>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE email = $1 OR username = $1 LIMIT 1");
        let account = sqlx::query_as::<_, AccountDBResponse>(&sql)
            .bind(identifier)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(account)
    }

    #[instrument(skip(self), fields(account_id = %abbrev_uuid(&id)), err)]
    pub async fn get_active_by_id(&mut self, id: AccountId) -> Result<Option<AccountDBResponse>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = $1 AND status = $2");
        let account = sqlx::query_as::<_, AccountDBResponse>(&sql)
            .bind(id)
            .bind(AccountStatus::Active.as_str())
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(account)
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_active_by_email(&mut self, email: &str) -> Result<Option<AccountDBResponse>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE email = $1 AND status = $2");
        let account = sqlx::query_as::<_, AccountDBResponse>(&sql)
            .bind(email)
            .bind(AccountStatus::Active.as_str())
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(account)
    }

    /// Whether any account already uses this email or username.
    #[instrument(skip(self, email, username), err)]
    pub async fn identity_taken(&mut self, email: &str, username: &str) -> Result<bool> {
        let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM account WHERE email = $1 OR username = $2)")
            .bind(email)
            .bind(username)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(taken)
    }

    /// Whether an account other than `id` already uses this email or username.
    #[instrument(skip(self, email, username), fields(account_id = %abbrev_uuid(&id)), err)]
    pub async fn identity_taken_by_other(&mut self, id: AccountId, email: &str, username: &str) -> Result<bool> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM account WHERE (email = $1 OR username = $2) AND id <> $3)")
                .bind(email)
                .bind(username)
                .bind(id)
                .fetch_one(&mut *self.db)
                .await?;

        Ok(taken)
    }

    /// Count a failed password attempt, locking the account once `threshold` is reached.
    ///
    /// The increment and the lock decision happen in one `UPDATE`, evaluated against the
    /// row as postgres locks it, so concurrent attempts cannot lose updates or both miss the
    /// threshold. Once the count reaches `threshold`, every further failure pushes
    /// `account_locked_until` out to `NOW() + lock_for` again; below it, an existing lock is
    /// left alone. The counter itself is only cleared by
    /// [`record_successful_login`](Self::record_successful_login).
    ///
    /// Returns the post-update counter and lock so the caller can decide whether to alert.
    #[instrument(skip(self), fields(account_id = %abbrev_uuid(&id)), err)]
    pub async fn record_failed_login(&mut self, id: AccountId, threshold: i32, lock_for: Duration) -> Result<FailedLoginUpdate> {
        let update = sqlx::query_as::<_, FailedLoginUpdate>(
            "UPDATE account SET \
                 failed_login_attempts = failed_login_attempts + 1, \
                 account_locked_until = CASE \
                     WHEN failed_login_attempts + 1 >= $2 THEN NOW() + make_interval(secs => $3) \
                     ELSE account_locked_until END \
             WHERE id = $1 \
             RETURNING failed_login_attempts, account_locked_until",
        )
        .bind(id)
        .bind(threshold)
        .bind(lock_for.as_secs_f64())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(update)
    }

    /// Reset lockout counters and stamp the login time.
    #[instrument(skip(self), fields(account_id = %abbrev_uuid(&id)), err)]
    pub async fn record_successful_login(&mut self, id: AccountId) -> Result<DateTime<Utc>> {
        let last_login: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE account SET failed_login_attempts = 0, account_locked_until = NULL, last_login = NOW() \
             WHERE id = $1 RETURNING last_login",
        )
        .bind(id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(last_login)
    }

    /// Replace the password hash; returns the new `last_password_changed_at`.
    #[instrument(skip(self, password_hash), fields(account_id = %abbrev_uuid(&id)), err)]
    pub async fn update_password(&mut self, id: AccountId, password_hash: &str) -> Result<DateTime<Utc>> {
        let changed_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE account SET password_hash = $2, last_password_changed_at = NOW() \
             WHERE id = $1 RETURNING last_password_changed_at",
        )
        .bind(id)
        .bind(password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(changed_at)
    }

    /// Store a reset token digest, replacing any outstanding one.
    #[instrument(skip(self, token_digest), fields(account_id = %abbrev_uuid(&id)), err)]
    pub async fn set_password_reset_token(&mut self, id: AccountId, token_digest: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE account SET password_reset_token = $2, password_reset_expires = $3 WHERE id = $1")
            .bind(id)
            .bind(token_digest)
            .bind(expires_at)
            .execute(&mut *self.db)
            .await?;

        Ok(())
    }

    /// Find the active account holding an unexpired reset token.
    #[instrument(skip(self, token_digest), err)]
    pub async fn get_by_reset_token(&mut self, token_digest: &str) -> Result<Option<AccountDBResponse>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account \
             WHERE password_reset_token = $1 AND password_reset_expires > NOW() AND status = $2"
        );
        let account = sqlx::query_as::<_, AccountDBResponse>(&sql)
            .bind(token_digest)
            .bind(AccountStatus::Active.as_str())
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(account)
    }

    /// Set a new password from a reset token: consumes the token and clears any lockout.
    #[instrument(skip(self, password_hash), fields(account_id = %abbrev_uuid(&id)), err)]
    pub async fn complete_password_reset(&mut self, id: AccountId, password_hash: &str) -> Result<DateTime<Utc>> {
        let changed_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE account SET password_hash = $2, last_password_changed_at = NOW(), \
                 password_reset_token = NULL, password_reset_expires = NULL, \
                 failed_login_attempts = 0, account_locked_until = NULL \
             WHERE id = $1 RETURNING last_password_changed_at",
        )
        .bind(id)
        .bind(password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(changed_at)
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}
