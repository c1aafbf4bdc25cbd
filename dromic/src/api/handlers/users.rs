use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    AppState,
    api::{
        extractors::JsonBody,
        handlers::auth::load_account_details,
        models::{
            activity::{ActivityListResponse, ActivityQuery, NotificationListResponse, NotificationQuery, NotificationResponse},
            pagination::{DEFAULT_LIMIT, MAX_LIMIT, PageQuery},
            users::{ChangePasswordRequest, CurrentUser, MessageResponse, UpdateProfileRequest},
        },
    },
    audit::{self, ActivityCategory, ActivityEntry, ActivityType, RequestMeta, password_snapshot},
    auth::password,
    db::{
        handlers::{Accounts, ActivityLogs, Notifications, Profiles, Repository},
        models::{
            accounts::{AccountDBResponse, AccountUpdateDBRequest},
            activity_logs::{ActivityLogFilter, ActivityStatus},
            notifications::{NotificationCreateDBRequest, NotificationPriority},
            profiles::ProfileUpdateDBRequest,
        },
    },
    email::EmailService,
    errors::Error,
    types::NotificationId,
    validation::Validator,
};

fn user_not_found() -> Error {
    Error::Missing {
        message: "User not found or inactive".to_string(),
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Update the caller's profile (`updateType: "profile"`) or login identity
/// (`updateType: "account"`).
#[utoipa::path(
    patch,
    path = "/api/user/profile",
    request_body = UpdateProfileRequest,
    tag = "user",
    responses(
        (status = 200, description = "Profile or account updated", body = MessageResponse),
        (status = 400, description = "Validation failed or invalid update type"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "User not found or inactive"),
        (status = 409, description = "Username or email already exists"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    meta: RequestMeta,
    current_user: CurrentUser,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, Error> {
    match request.update_type.as_str() {
        "profile" => update_profile_fields(&state, &meta, &current_user, &request).await,
        "account" => update_account_identity(&state, &meta, &current_user, &request).await,
        _ => Err(Error::BadRequest {
            message: "Invalid update type".to_string(),
        }),
    }
    .map(Json)
}

async fn update_profile_fields(
    state: &AppState,
    meta: &RequestMeta,
    current_user: &CurrentUser,
    request: &UpdateProfileRequest,
) -> Result<MessageResponse, Error> {
    let mut validator = Validator::new();
    validator
        .required("firstName", request.first_name.as_deref(), "First name")
        .required("lastName", request.last_name.as_deref(), "Last name")
        .required("phoneNumber", request.phone_number.as_deref(), "Phone number")
        .required("address", request.address.as_deref(), "Address")
        .required("jobTitle", request.job_title.as_deref(), "Job title")
        .required("region", request.region.as_deref(), "Region")
        .required("province", request.province.as_deref(), "Province")
        .required("city", request.city.as_deref(), "City");
    let date_of_birth = validator.date_of_birth("dateOfBirth", request.date_of_birth.as_deref());
    validator.finish()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let account = Accounts::new(&mut conn)
        .get_active_by_id(current_user.id)
        .await?
        .ok_or_else(user_not_found)?;
    let (profile, _) = load_account_details(&mut conn, &account).await?;

    let before = profile.fields();
    let update = ProfileUpdateDBRequest {
        first_name: trimmed(&request.first_name).unwrap_or_default(),
        middle_name: trimmed(&request.middle_name),
        last_name: trimmed(&request.last_name).unwrap_or_default(),
        // Not part of the profile form; keep what is stored
        name_extension: trimmed(&request.name_extension).or(before.name_extension.clone()),
        date_of_birth,
        phone_number: trimmed(&request.phone_number),
        address: trimmed(&request.address),
        job_title: trimmed(&request.job_title),
        division: trimmed(&request.division),
        region: trimmed(&request.region),
        province: trimmed(&request.province),
        city: trimmed(&request.city),
        barangay: trimmed(&request.barangay),
    };
    let updated = Profiles::new(&mut conn).update(profile.id, &update).await?;
    drop(conn);

    audit::record(
        &state.db,
        meta,
        ActivityEntry::builder()
            .account_id(account.id)
            .activity_type(ActivityType::Update)
            .category(ActivityCategory::User)
            .target_table("profile")
            .target_id(updated.id)
            .target_name(updated.full_name())
            .notes("Profile information updated")
            .before_state(json!(before))
            .after_state(json!(updated.fields()))
            .build(),
    )
    .await;

    Ok(MessageResponse::new("Profile updated successfully"))
}

async fn update_account_identity(
    state: &AppState,
    meta: &RequestMeta,
    current_user: &CurrentUser,
    request: &UpdateProfileRequest,
) -> Result<MessageResponse, Error> {
    let username = trimmed(&request.username).unwrap_or_default();
    let email = trimmed(&request.email).unwrap_or_default();
    Validator::new()
        .username("username", &username)
        .email("email", &email)
        .finish()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let account = Accounts::new(&mut conn)
        .get_active_by_id(current_user.id)
        .await?
        .ok_or_else(user_not_found)?;

    if Accounts::new(&mut conn)
        .identity_taken_by_other(account.id, &email, &username)
        .await?
    {
        return Err(Error::Conflict {
            message: "Username or email already exists".to_string(),
        });
    }

    let updated = Accounts::new(&mut conn)
        .update(account.id, &AccountUpdateDBRequest { username, email })
        .await?;
    drop(conn);

    audit::record(
        &state.db,
        meta,
        ActivityEntry::builder()
            .account_id(account.id)
            .activity_type(ActivityType::Update)
            .category(ActivityCategory::Account)
            .target_table("account")
            .target_id(account.id)
            .target_name(updated.username.clone())
            .notes("Account information updated")
            .before_state(identity_snapshot(&account))
            .after_state(identity_snapshot(&updated))
            .build(),
    )
    .await;

    Ok(MessageResponse::new("Account updated successfully"))
}

fn identity_snapshot(account: &AccountDBResponse) -> serde_json::Value {
    json!({ "username": account.username, "email": account.email })
}

/// Change the caller's password.
#[utoipa::path(
    post,
    path = "/api/user/change-password",
    request_body = ChangePasswordRequest,
    tag = "user",
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation failed or current password is incorrect"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "User not found or inactive"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    meta: RequestMeta,
    current_user: CurrentUser,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, Error> {
    let password_config = &state.config.auth.password;
    Validator::new()
        .required("currentPassword", Some(request.current_password.as_str()), "Current password")
        .password("newPassword", &request.new_password, password_config.min_length, password_config.max_length)
        .matches("confirmNewPassword", &request.confirm_new_password, &request.new_password)
        .finish()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let account = Accounts::new(&mut conn)
        .get_active_by_id(current_user.id)
        .await?
        .ok_or_else(user_not_found)?;

    let is_valid = password::verify_password_blocking(request.current_password, account.password_hash.clone()).await?;
    if !is_valid {
        drop(conn);
        audit::record(
            &state.db,
            &meta,
            ActivityEntry::builder()
                .account_id(account.id)
                .activity_type(ActivityType::Update)
                .category(ActivityCategory::Account)
                .status(ActivityStatus::Failed)
                .target_table("account")
                .target_id(account.id)
                .target_name(account.username.clone())
                .details(json!({ "reason": "invalid_current_password" }))
                .notes("Failed password change attempt - invalid current password")
                .build(),
        )
        .await;
        return Err(Error::BadRequest {
            message: "Current password is incorrect".to_string(),
        });
    }

    let password_hash = password::hash_password_blocking(request.new_password, password_config.bcrypt_cost).await?;
    let changed_at = Accounts::new(&mut conn).update_password(account.id, &password_hash).await?;
    let (profile, _) = load_account_details(&mut conn, &account).await?;

    let notification = NotificationCreateDBRequest {
        recipient_id: account.id,
        notification_type: "password_changed".to_string(),
        title: "Password changed".to_string(),
        message: "Your password was changed. If this was not you, contact your administrator.".to_string(),
        data: Some(json!({ "changed_at": changed_at })),
        priority: NotificationPriority::Medium,
        expires_at: None,
    };
    if let Err(e) = Notifications::new(&mut conn).create(&notification).await {
        warn!(error = %e, "Failed to create password change notification");
    }
    drop(conn);

    info!(account_id = %account.id, "Password changed");
    audit::record(
        &state.db,
        &meta,
        ActivityEntry::builder()
            .account_id(account.id)
            .activity_type(ActivityType::Update)
            .category(ActivityCategory::Account)
            .target_table("account")
            .target_id(account.id)
            .target_name(account.username.clone())
            .notes("Password changed")
            .before_state(password_snapshot(account.last_password_changed_at))
            .after_state(password_snapshot(Some(changed_at)))
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

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// The caller's own activity, newest first.
#[utoipa::path(
    get,
    path = "/api/user/activity",
    params(ActivityQuery),
    tag = "user",
    responses(
        (status = 200, description = "Activity page", body = ActivityListResponse),
        (status = 401, description = "No valid session"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
    current_user: CurrentUser,
) -> Result<Json<ActivityListResponse>, Error> {
    let page = PageQuery::new(query.page, query.limit);
    let filter = ActivityLogFilter {
        account_id: Some(current_user.id),
        activity_type: query.activity_type.clone().filter(|t| !t.is_empty()),
        activity_category: query.activity_category.clone().filter(|c| !c.is_empty()),
        within_days: query.within_days(),
        skip: page.offset(),
        limit: page.limit,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut logs = ActivityLogs::new(&mut conn);
    let total = logs.count(&filter).await?;
    let activities = logs.list(&filter).await?;

    Ok(Json(ActivityListResponse {
        activities: activities.into_iter().map(Into::into).collect(),
        has_more: page.has_more(total),
        total,
        page: page.page,
        limit: page.limit,
    }))
}

/// The caller's unexpired notifications, unread first.
#[utoipa::path(
    get,
    path = "/api/user/notifications",
    params(NotificationQuery),
    tag = "user",
    responses(
        (status = 200, description = "Notifications", body = NotificationListResponse),
        (status = 401, description = "No valid session"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
    current_user: CurrentUser,
) -> Result<Json<NotificationListResponse>, Error> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let notifications = Notifications::new(&mut conn)
        .list_for_recipient(current_user.id, query.unread.unwrap_or(false), skip, limit)
        .await?;

    Ok(Json(NotificationListResponse {
        notifications: notifications.into_iter().map(Into::into).collect(),
    }))
}

/// Mark one of the caller's notifications read.
#[utoipa::path(
    post,
    path = "/api/user/notifications/{id}/read",
    params(("id" = uuid::Uuid, Path, description = "Notification ID")),
    tag = "user",
    responses(
        (status = 200, description = "Notification marked read", body = NotificationResponse),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Notification not found"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
    current_user: CurrentUser,
) -> Result<Json<NotificationResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let notification = Notifications::new(&mut conn)
        .mark_read(id, current_user.id)
        .await?
        .ok_or_else(|| Error::Missing {
            message: "Notification not found".to_string(),
        })?;

    Ok(Json(notification.into()))
}
