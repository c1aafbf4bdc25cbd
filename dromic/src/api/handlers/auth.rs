use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde_json::json;
use sqlx::PgConnection;
use tracing::{info, warn};

use crate::{
    AppState,
    api::{
        extractors::JsonBody,
        models::{
            auth::{
                AuthResponse, ForgotPasswordRequest, LoginRequest, LoginResponse, LogoutResponse, RegisterRequest, RegisterResponse,
                ResetPasswordRequest, WithCookie,
            },
            users::{CurrentUser, MeResponse, MessageResponse, UserResponse, UserSummary},
        },
    },
    audit::{self, ActivityCategory, ActivityEntry, ActivityType, RequestMeta, password_snapshot},
    auth::{
        lockout::{LockoutPolicy, is_locked},
        password, session,
    },
    config::Config,
    db::{
        handlers::{Accounts, Notifications, Profiles, Repository, UserLevels},
        models::{
            accounts::{AccountCreateDBRequest, AccountDBResponse, AccountStatus},
            activity_logs::ActivityStatus,
            notifications::{NotificationCreateDBRequest, NotificationPriority},
            profiles::{ProfileCreateDBRequest, ProfileDBResponse},
            user_levels::UserLevelDBResponse,
        },
    },
    email::EmailService,
    errors::Error,
    validation::Validator,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const RESET_REQUESTED: &str = "If an account with that email exists, a password reset link has been sent.";

/// Load the profile and user level that hang off an account.
pub(crate) async fn load_account_details(
    conn: &mut PgConnection,
    account: &AccountDBResponse,
) -> Result<(ProfileDBResponse, Option<UserLevelDBResponse>), Error> {
    let profile = Profiles::new(&mut *conn).get_by_id(account.profile_id).await?.ok_or_else(|| Error::Internal {
        operation: format!("load profile {} for account {}", account.profile_id, account.id),
    })?;

    let level = match account.user_level_id {
        Some(level_id) => UserLevels::new(&mut *conn).get_by_id(level_id).await?,
        None => None,
    };

    Ok((profile, level))
}

/// Sign in with an email address or username.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful; sets the session cookie", body = AuthResponse),
        (status = 400, description = "Missing or malformed credentials"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account is not active"),
        (status = 423, description = "Account is temporarily locked"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, meta: RequestMeta, JsonBody(request): JsonBody<LoginRequest>) -> Result<LoginResponse, Error> {
    // Blank credentials never reach the account, so they cannot count towards a lockout
    Validator::new()
        .required("email", Some(request.email.as_str()), "Email or username")
        .required("password", Some(request.password.as_str()), "Password")
        .finish()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let policy = LockoutPolicy::from(&state.config.auth.lockout);

    let Some(account) = Accounts::new(&mut conn).get_by_login_identifier(&request.email).await? else {
        metrics::counter!("dromic_login_attempts_total", "outcome" => "user_not_found").increment(1);
        audit::record(
            &state.db,
            &meta,
            ActivityEntry::builder()
                .activity_type(ActivityType::FailedLogin)
                .category(ActivityCategory::Session)
                .status(ActivityStatus::Failed)
                .target_table("account")
                .target_name(request.email.clone())
                .details(json!({
                    "reason": "user_not_found",
                    "attempted_credential": request.email,
                }))
                .notes("Login attempt with invalid email/username")
                .build(),
        )
        .await;
        return Err(Error::Unauthenticated {
            message: Some("Invalid email/username or password".to_string()),
        });
    };

    // Locked accounts are rejected before the password is checked
    if is_locked(account.account_locked_until, Utc::now()) {
        metrics::counter!("dromic_login_attempts_total", "outcome" => "account_locked").increment(1);
        audit::record(
            &state.db,
            &meta,
            failed_login(
                &account,
                json!({
                    "reason": "account_locked",
                    "locked_until": account.account_locked_until,
                }),
                "Login attempt on locked account",
            ),
        )
        .await;
        return Err(Error::Locked {
            message: "Account is temporarily locked. Please try again later.".to_string(),
        });
    }

    if account.status != AccountStatus::Active {
        metrics::counter!("dromic_login_attempts_total", "outcome" => "account_inactive").increment(1);
        audit::record(
            &state.db,
            &meta,
            failed_login(
                &account,
                json!({
                    "reason": "account_inactive",
                    "account_status": account.status,
                }),
                "Login attempt on inactive account",
            ),
        )
        .await;
        return Err(Error::Forbidden {
            message: "Account is not active. Please contact administrator.".to_string(),
        });
    }

    let is_valid = password::verify_password_blocking(request.password, account.password_hash.clone()).await?;

    if !is_valid {
        let update = Accounts::new(&mut conn)
            .record_failed_login(account.id, policy.max_failed_attempts, policy.duration)
            .await?;
        let outcome = policy.outcome(&update, Utc::now());

        metrics::counter!("dromic_login_attempts_total", "outcome" => "invalid_password").increment(1);
        let mut details = json!({ "reason": "invalid_password" });
        if let (Some(map), Ok(serde_json::Value::Object(extra))) = (details.as_object_mut(), serde_json::to_value(&outcome)) {
            map.extend(extra);
        }
        audit::record(
            &state.db,
            &meta,
            failed_login(&account, details, "Login attempt with invalid password"),
        )
        .await;

        if outcome.account_locked {
            metrics::counter!("dromic_account_lockouts_total").increment(1);
            warn!(
                account_id = %account.id,
                failed_attempts = outcome.failed_attempts,
                "Account locked after repeated failed logins"
            );
            let notification = NotificationCreateDBRequest {
                recipient_id: account.id,
                notification_type: "security_alert".to_string(),
                title: "Account locked".to_string(),
                message: format!(
                    "Your account was locked for {} minutes after {} failed login attempts.",
                    policy.duration.as_secs() / 60,
                    outcome.failed_attempts
                ),
                data: serde_json::to_value(&outcome).ok(),
                priority: NotificationPriority::High,
                expires_at: None,
            };
            if let Err(e) = Notifications::new(&mut conn).create(&notification).await {
                warn!(error = %e, "Failed to create lockout notification");
            }
        }

        return Err(Error::Unauthenticated {
            message: Some(INVALID_CREDENTIALS.to_string()),
        });
    }

    Accounts::new(&mut conn).record_successful_login(account.id).await?;
    let (profile, level) = load_account_details(&mut conn, &account).await?;

    let current_user = CurrentUser::new_session(&account, level.as_ref());
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    metrics::counter!("dromic_login_attempts_total", "outcome" => "success").increment(1);
    info!(account_id = %account.id, "Login successful");
    audit::record(
        &state.db,
        &meta,
        ActivityEntry::builder()
            .account_id(account.id)
            .activity_type(ActivityType::Login)
            .category(ActivityCategory::Session)
            .target_table("account")
            .target_id(account.id)
            .target_name(account.username.clone())
            .details(json!({
                "session_id": current_user.session_id,
                "previous_failed_attempts": account.failed_login_attempts,
            }))
            .notes("Successful login")
            .build(),
    )
    .await;

    Ok(WithCookie {
        status: StatusCode::OK,
        body: AuthResponse {
            message: "Login successful".to_string(),
            user: UserSummary::new(&account, &profile, level.as_ref()),
        },
        cookie,
    })
}

fn failed_login(account: &AccountDBResponse, details: serde_json::Value, notes: &str) -> ActivityEntry {
    ActivityEntry::builder()
        .account_id(account.id)
        .activity_type(ActivityType::FailedLogin)
        .category(ActivityCategory::Session)
        .status(ActivityStatus::Failed)
        .target_table("account")
        .target_id(account.id)
        .target_name(account.username.clone())
        .details(details)
        .notes(notes)
        .build()
}

/// Clear the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, meta: RequestMeta, current_user: Option<CurrentUser>) -> Result<LogoutResponse, Error> {
    if let Some(user) = current_user {
        audit::record(
            &state.db,
            &meta,
            ActivityEntry::builder()
                .account_id(user.id)
                .activity_type(ActivityType::Logout)
                .category(ActivityCategory::Session)
                .target_table("account")
                .target_id(user.id)
                .details(json!({ "session_id": user.session_id }))
                .notes("User logged out")
                .build(),
        )
        .await;
    }

    Ok(WithCookie {
        status: StatusCode::OK,
        body: MessageResponse::new("Logout successful"),
        cookie: clear_session_cookie(&state.config),
    })
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation failed, duplicate user or invalid position"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    meta: RequestMeta,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<RegisterResponse, Error> {
    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    let password_config = &state.config.auth.password;
    let mut validator = Validator::new();
    validator
        .email("email", &request.email)
        .username("username", &request.username)
        .password("password", &request.password, password_config.min_length, password_config.max_length)
        .matches("confirmPassword", &request.confirm_password, &request.password)
        .required("firstName", Some(request.first_name.as_str()), "First name")
        .required("lastName", Some(request.last_name.as_str()), "Last name")
        .required("phoneNumber", Some(request.phone_number.as_str()), "Phone number")
        .required("address", Some(request.address.as_str()), "Address")
        .required("jobTitle", Some(request.job_title.as_str()), "Job title")
        .position("position", &request.position)
        .accepted("termsAccepted", request.terms_accepted);
    let date_of_birth = validator.date_of_birth("dateOfBirth", Some(request.date_of_birth.as_str()));
    validator.finish()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Accounts::new(&mut conn).identity_taken(&request.email, &request.username).await? {
        return Err(Error::BadRequest {
            message: "User with this email or username already exists".to_string(),
        });
    }

    let level = UserLevels::new(&mut conn)
        .get_active_by_position(&request.position)
        .await?
        .ok_or_else(|| Error::BadRequest {
            message: "Invalid position selected".to_string(),
        })?;
    drop(conn);

    let password_hash = password::hash_password_blocking(request.password.clone(), password_config.bcrypt_cost).await?;

    let profile_request = ProfileCreateDBRequest {
        first_name: request.first_name.trim().to_string(),
        middle_name: non_empty(request.middle_name),
        last_name: request.last_name.trim().to_string(),
        name_extension: non_empty(request.name_extension),
        date_of_birth,
        phone_number: Some(request.phone_number),
        address: Some(request.address),
        job_title: Some(request.job_title),
        division: non_empty(request.division),
        region: non_empty(request.region),
        province: non_empty(request.province),
        city: non_empty(request.city),
        barangay: non_empty(request.barangay),
    };

    // Profile and account go in together or not at all
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let profile = Profiles::new(&mut tx).create(&profile_request).await?;
    let account = Accounts::new(&mut tx)
        .create(&AccountCreateDBRequest {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash,
            status: AccountStatus::Active,
            profile_id: profile.id,
            user_level_id: Some(level.id),
            email_verified: false,
            terms_accepted: request.terms_accepted,
            privacy_policy_accepted: request.privacy_policy_accepted,
        })
        .await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let current_user = CurrentUser::new_session(&account, Some(&level));
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    info!(account_id = %account.id, position = %level.position, "Account registered");
    audit::record(
        &state.db,
        &meta,
        ActivityEntry::builder()
            .account_id(account.id)
            .activity_type(ActivityType::Register)
            .category(ActivityCategory::Account)
            .target_table("account")
            .target_id(account.id)
            .target_name(account.username.clone())
            .after_state(json!({
                "username": account.username,
                "email": account.email,
                "position": level.position,
                "profile": profile.fields(),
            }))
            .notes("New account registered")
            .build(),
    )
    .await;

    Ok(WithCookie {
        status: StatusCode::CREATED,
        body: AuthResponse {
            message: "Registration successful".to_string(),
            user: UserSummary::new(&account, &profile, Some(&level)),
        },
        cookie,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// The signed-in account with its profile and user level.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "No valid session"),
        (status = 404, description = "User not found or inactive"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn me(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<MeResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let account = Accounts::new(&mut conn)
        .get_active_by_id(current_user.id)
        .await?
        .ok_or_else(|| Error::Missing {
            message: "User not found or inactive".to_string(),
        })?;
    let (profile, level) = load_account_details(&mut conn, &account).await?;

    Ok(Json(MeResponse {
        user: UserResponse::new(account, profile, level),
    }))
}

/// Start a password reset. Always answers 200 so the response does not reveal which emails
/// have accounts.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Reset email sent if the account exists", body = MessageResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    meta: RequestMeta,
    JsonBody(request): JsonBody<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let Some(account) = Accounts::new(&mut conn).get_active_by_email(request.email.trim()).await? else {
        return Ok(Json(MessageResponse::new(RESET_REQUESTED)));
    };

    let token = password::generate_reset_token();
    let expires_at = Utc::now() + state.config.auth.password_reset_token_duration;
    Accounts::new(&mut conn)
        .set_password_reset_token(account.id, &password::reset_token_digest(&token), expires_at)
        .await?;
    let (profile, _) = load_account_details(&mut conn, &account).await?;
    drop(conn);

    let sent = match EmailService::new(&state.config) {
        Ok(email) => email.send_password_reset_email(&account.email, &profile.full_name(), &token).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &sent {
        tracing::error!(account_id = %account.id, error = %e, "Failed to send password reset email");
    }

    audit::record(
        &state.db,
        &meta,
        ActivityEntry::builder()
            .account_id(account.id)
            .activity_type(ActivityType::PasswordResetRequest)
            .category(ActivityCategory::Account)
            .status(if sent.is_ok() { ActivityStatus::Success } else { ActivityStatus::Error })
            .target_table("account")
            .target_id(account.id)
            .target_name(account.username.clone())
            .details(json!({ "expires_at": expires_at }))
            .notes("Password reset requested")
            .build(),
    )
    .await;

    Ok(Json(MessageResponse::new(RESET_REQUESTED)))
}

/// Set a new password using an emailed reset token.
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Password has been reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired token, or weak password"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    meta: RequestMeta,
    JsonBody(request): JsonBody<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, Error> {
    let password_config = &state.config.auth.password;
    Validator::new()
        .required("token", Some(request.token.as_str()), "Reset token")
        .password("password", &request.password, password_config.min_length, password_config.max_length)
        .matches("confirmPassword", &request.confirm_password, &request.password)
        .finish()?;

    let digest = password::reset_token_digest(request.token.trim());
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let account = Accounts::new(&mut conn)
        .get_by_reset_token(&digest)
        .await?
        .ok_or_else(|| Error::BadRequest {
            message: "Invalid or expired reset token".to_string(),
        })?;

    let password_hash = password::hash_password_blocking(request.password, password_config.bcrypt_cost).await?;
    let changed_at = Accounts::new(&mut conn).complete_password_reset(account.id, &password_hash).await?;
    let (profile, _) = load_account_details(&mut conn, &account).await?;
    drop(conn);

    info!(account_id = %account.id, "Password reset completed");
    audit::record(
        &state.db,
        &meta,
        ActivityEntry::builder()
            .account_id(account.id)
            .activity_type(ActivityType::PasswordReset)
            .category(ActivityCategory::Account)
            .target_table("account")
            .target_id(account.id)
            .target_name(account.username.clone())
            .before_state(password_snapshot(account.last_password_changed_at))
            .after_state(password_snapshot(Some(changed_at)))
            .notes("Password reset with emailed token")
            .build(),
    )
    .await;

    match EmailService::new(&state.config) {
        Ok(email) => {
            if let Err(e) = email.send_password_changed_email(&account.email, &profile.full_name()).await {
                warn!(error = %e, "Failed to send password changed email");
            }
        }
        Err(e) => warn!(error = %e, "Email service unavailable"),
    }

    Ok(Json(MessageResponse::new("Password has been reset successfully")))
}

fn same_site(config: &Config) -> &'static str {
    match config.auth.session.cookie_same_site.as_str() {
        "lax" => "Lax",
        "none" => "None",
        _ => "Strict",
    }
}

fn cookie_with_max_age(config: &Config, value: &str, max_age: u64) -> String {
    let session_config = &config.auth.session;
    let secure = if session_config.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}={}; Path=/; HttpOnly{}; SameSite={}; Max-Age={}",
        session_config.cookie_name,
        value,
        secure,
        same_site(config),
        max_age
    )
}

/// `Set-Cookie` value carrying a freshly signed session token.
pub(crate) fn create_session_cookie(token: &str, config: &Config) -> String {
    cookie_with_max_age(config, token, config.auth.session.timeout.as_secs())
}

fn clear_session_cookie(config: &Config) -> String {
    cookie_with_max_age(config, "", 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::models::activity::ActivityListResponse,
        db::{handlers::ActivityLogs, models::activity_logs::ActivityLogFilter},
        test_utils::{TEST_PASSWORD, create_test_account, create_test_config, create_test_state, seed_test_user_levels, session_cookie_for},
    };
    use axum_test::TestServer;
    use sqlx::PgPool;

    fn server(pool: PgPool) -> TestServer {
        let state = create_test_state(pool, create_test_config());
        TestServer::new(crate::build_router(state)).unwrap()
    }

    fn registration(email: &str, username: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "Disaster2024".to_string(),
            confirm_password: "Disaster2024".to_string(),
            first_name: "Juan".to_string(),
            last_name: "Dela Cruz".to_string(),
            date_of_birth: "1990-05-12".to_string(),
            phone_number: "09171234567".to_string(),
            address: "123 Rizal St.".to_string(),
            position: "Field Officer".to_string(),
            job_title: "Social Worker".to_string(),
            region: Some("Region I".to_string()),
            terms_accepted: true,
            privacy_policy_accepted: true,
            ..Default::default()
        }
    }

    async fn failed_login_rows(pool: &PgPool) -> i64 {
        let mut conn = pool.acquire().await.unwrap();
        ActivityLogs::new(&mut conn)
            .count(&ActivityLogFilter {
                activity_type: Some("failed_login".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_session_cookie_format() {
        let mut config = create_test_config();
        config.auth.session.cookie_secure = true;
        let cookie = create_session_cookie("tok", &config);
        assert_eq!(cookie, "auth-token=tok; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=604800");

        config.auth.session.cookie_secure = false;
        assert_eq!(
            clear_session_cookie(&config),
            "auth-token=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0"
        );
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_with_username_sets_cookie(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let account = create_test_account(&pool, "jdelacruz", "jdelacruz@dswd.gov.ph").await;
        let server = server(pool.clone());

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "jdelacruz", "password": TEST_PASSWORD }))
            .await;

        response.assert_status_ok();
        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.starts_with("auth-token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));

        let body: AuthResponse = response.json();
        assert_eq!(body.user.id, account.id);
        assert_eq!(body.user.position.as_deref(), Some("Field Officer"));

        let mut conn = pool.acquire().await.unwrap();
        let stored = Accounts::new(&mut conn).get_by_id(account.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }

    #[sqlx::test]
    async fn test_login_unknown_user(pool: PgPool) {
        let server = server(pool.clone());

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "nobody@example.com", "password": "whatever" }))
            .await;

        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Invalid email/username or password");
        assert_eq!(failed_login_rows(&pool).await, 1);
    }

    #[sqlx::test]
    async fn test_five_failures_lock_the_account(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let account = create_test_account(&pool, "lockme", "lockme@dswd.gov.ph").await;
        let server = server(pool.clone());

        for _ in 0..5 {
            let response = server
                .post("/api/auth/login")
                .json(&json!({ "email": "lockme@dswd.gov.ph", "password": "Wrong-pass1" }))
                .await;
            response.assert_status_unauthorized();
            let body: serde_json::Value = response.json();
            assert_eq!(body["error"], INVALID_CREDENTIALS);
        }

        // Correct password, still locked
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "lockme@dswd.gov.ph", "password": TEST_PASSWORD }))
            .await;
        response.assert_status(StatusCode::LOCKED);

        let mut conn = pool.acquire().await.unwrap();
        let stored = Accounts::new(&mut conn).get_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_login_attempts, 5);
        let locked_until = stored.account_locked_until.unwrap();
        let remaining = locked_until - Utc::now();
        assert!(remaining > chrono::Duration::minutes(14) && remaining <= chrono::Duration::minutes(15));

        let notifications = Notifications::new(&mut conn)
            .list_for_recipient(account.id, true, 0, 10)
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].priority, NotificationPriority::High);

        // Five invalid passwords plus the locked attempt
        assert_eq!(failed_login_rows(&pool).await, 6);
    }

    #[sqlx::test]
    async fn test_login_missing_field_is_validation_error(pool: PgPool) {
        let server = server(pool.clone());

        let response = server.post("/api/auth/login").json(&json!({ "email": "someone" })).await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0]["field"], "password");
        assert!(body["details"][0]["message"].as_str().is_some_and(|m| !m.is_empty()));
        assert_eq!(failed_login_rows(&pool).await, 0);
    }

    #[sqlx::test]
    async fn test_login_blank_password_does_not_count_towards_lockout(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let account = create_test_account(&pool, "blank", "blank@dswd.gov.ph").await;
        let server = server(pool.clone());

        for _ in 0..5 {
            let response = server
                .post("/api/auth/login")
                .json(&json!({ "email": "blank@dswd.gov.ph", "password": "" }))
                .await;
            response.assert_status_bad_request();
            let body: serde_json::Value = response.json();
            assert_eq!(body["error"], "Validation failed");
            assert_eq!(body["details"][0]["field"], "password");
            assert_eq!(body["details"][0]["message"], "Password is required");
        }

        let mut conn = pool.acquire().await.unwrap();
        let stored = Accounts::new(&mut conn).get_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_login_attempts, 0);
        assert!(stored.account_locked_until.is_none());
        assert_eq!(failed_login_rows(&pool).await, 0);

        server
            .post("/api/auth/login")
            .json(&json!({ "email": "blank@dswd.gov.ph", "password": TEST_PASSWORD }))
            .await
            .assert_status_ok();
    }

    #[sqlx::test]
    async fn test_login_non_json_body_is_validation_error(pool: PgPool) {
        let response = server(pool).post("/api/auth/login").text("email=someone&password=x").await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0]["field"], "body");
    }

    #[sqlx::test]
    async fn test_success_resets_failed_attempts(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let account = create_test_account(&pool, "retry", "retry@dswd.gov.ph").await;
        let server = server(pool.clone());

        for _ in 0..3 {
            server
                .post("/api/auth/login")
                .json(&json!({ "email": "retry", "password": "Wrong-pass1" }))
                .await
                .assert_status_unauthorized();
        }

        server
            .post("/api/auth/login")
            .json(&json!({ "email": "retry", "password": TEST_PASSWORD }))
            .await
            .assert_status_ok();

        let mut conn = pool.acquire().await.unwrap();
        let stored = Accounts::new(&mut conn).get_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_login_attempts, 0);
        assert!(stored.account_locked_until.is_none());
    }

    #[sqlx::test]
    async fn test_inactive_account_forbidden(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let account = create_test_account(&pool, "dormant", "dormant@dswd.gov.ph").await;
        sqlx::query("UPDATE account SET status = 'Inactive' WHERE id = $1")
            .bind(account.id)
            .execute(&pool)
            .await
            .unwrap();

        let response = server(pool)
            .post("/api/auth/login")
            .json(&json!({ "email": "dormant", "password": TEST_PASSWORD }))
            .await;
        response.assert_status_forbidden();
    }

    #[sqlx::test]
    async fn test_register_creates_account_and_session(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let server = server(pool.clone());

        let response = server
            .post("/api/auth/register")
            .json(&registration("juan@dswd.gov.ph", "juan"))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert!(response.headers().get("set-cookie").is_some());
        let body: AuthResponse = response.json();
        assert_eq!(body.message, "Registration successful");
        assert_eq!(body.user.email, "juan@dswd.gov.ph");
        assert_eq!(body.user.abbreviation.as_deref(), Some("FO"));

        let mut conn = pool.acquire().await.unwrap();
        let register_rows = ActivityLogs::new(&mut conn)
            .count(&ActivityLogFilter {
                account_id: Some(body.user.id),
                activity_type: Some("register".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(register_rows, 1);
    }

    #[sqlx::test]
    async fn test_register_duplicate_leaves_no_partial_rows(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let server = server(pool.clone());

        server
            .post("/api/auth/register")
            .json(&registration("juan@dswd.gov.ph", "juan"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/auth/register")
            .json(&registration("other@dswd.gov.ph", "juan"))
            .await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "User with this email or username already exists");

        let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile").fetch_one(&pool).await.unwrap();
        let accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account").fetch_one(&pool).await.unwrap();
        assert_eq!((profiles, accounts), (1, 1));
    }

    #[sqlx::test]
    async fn test_register_validation_errors(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let mut request = registration("not-an-email", "ab");
        request.password = "weak".to_string();
        request.date_of_birth = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        request.terms_accepted = false;

        let response = server(pool).post("/api/auth/register").json(&request).await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Validation failed");
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        for field in ["email", "username", "password", "confirmPassword", "termsAccepted", "dateOfBirth"] {
            assert!(fields.contains(&field), "missing error for {field}: {fields:?}");
        }
    }

    #[sqlx::test]
    async fn test_register_unknown_position(pool: PgPool) {
        // No user levels seeded, so the valid position has no active row
        let response = server(pool)
            .post("/api/auth/register")
            .json(&registration("juan@dswd.gov.ph", "juan"))
            .await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Invalid position selected");
    }

    #[sqlx::test]
    async fn test_register_disabled(pool: PgPool) {
        let mut config = create_test_config();
        config.auth.allow_registration = false;
        let server = TestServer::new(crate::build_router(create_test_state(pool, config))).unwrap();

        server
            .post("/api/auth/register")
            .json(&registration("juan@dswd.gov.ph", "juan"))
            .await
            .assert_status_bad_request();
    }

    #[sqlx::test]
    async fn test_me_and_logout(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let account = create_test_account(&pool, "maria", "maria@dswd.gov.ph").await;
        let config = create_test_config();
        let cookie = session_cookie_for(&account, &config);
        let server = server(pool.clone());

        server.get("/api/auth/me").await.assert_status_unauthorized();

        let response = server.get("/api/auth/me").add_header("cookie", cookie.clone()).await;
        response.assert_status_ok();
        let body: MeResponse = response.json();
        assert_eq!(body.user.username, "maria");
        assert_eq!(body.user.user_level.unwrap().position, "Field Officer");

        let response = server.post("/api/auth/logout").add_header("cookie", cookie.clone()).await;
        response.assert_status_ok();
        assert!(response.headers().get("set-cookie").unwrap().to_str().unwrap().contains("Max-Age=0"));

        let activity: ActivityListResponse = server
            .get("/api/user/activity?activity_type=logout")
            .add_header("cookie", cookie)
            .await
            .json();
        assert_eq!(activity.total, 1);
    }

    #[sqlx::test]
    async fn test_me_inactive_account(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let account = create_test_account(&pool, "gone", "gone@dswd.gov.ph").await;
        let cookie = session_cookie_for(&account, &create_test_config());
        sqlx::query("UPDATE account SET status = 'Suspended' WHERE id = $1")
            .bind(account.id)
            .execute(&pool)
            .await
            .unwrap();

        let response = server(pool).get("/api/auth/me").add_header("cookie", cookie).await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "User not found or inactive");
    }

    #[sqlx::test]
    async fn test_logout_without_session(pool: PgPool) {
        let response = server(pool).post("/api/auth/logout").await;
        response.assert_status_ok();
        let body: MessageResponse = response.json();
        assert_eq!(body.message, "Logout successful");
    }

    #[sqlx::test]
    async fn test_password_reset_flow(pool: PgPool) {
        seed_test_user_levels(&pool).await;
        let account = create_test_account(&pool, "forgetful", "forgetful@dswd.gov.ph").await;
        let server = server(pool.clone());

        let response = server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "unknown@dswd.gov.ph" }))
            .await;
        response.assert_status_ok();
        let unknown: MessageResponse = response.json();

        let response = server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "forgetful@dswd.gov.ph" }))
            .await;
        response.assert_status_ok();
        let known: MessageResponse = response.json();
        assert_eq!(unknown.message, known.message);

        // Swap in a token we know, since the real one only exists in the email
        let token = password::generate_reset_token();
        let mut conn = pool.acquire().await.unwrap();
        Accounts::new(&mut conn)
            .set_password_reset_token(
                account.id,
                &password::reset_token_digest(&token),
                Utc::now() + chrono::Duration::minutes(30),
            )
            .await
            .unwrap();

        server
            .post("/api/auth/reset-password")
            .json(&json!({ "token": "bogus", "password": "NewPass123", "confirmPassword": "NewPass123" }))
            .await
            .assert_status_bad_request();

        server
            .post("/api/auth/reset-password")
            .json(&json!({ "token": token, "password": "NewPass123", "confirmPassword": "NewPass123" }))
            .await
            .assert_status_ok();

        // Token is single use
        server
            .post("/api/auth/reset-password")
            .json(&json!({ "token": token, "password": "NewPass456", "confirmPassword": "NewPass456" }))
            .await
            .assert_status_bad_request();

        server
            .post("/api/auth/login")
            .json(&json!({ "email": "forgetful", "password": "NewPass123" }))
            .await
            .assert_status_ok();
    }
}
