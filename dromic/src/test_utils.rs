//! Shared fixtures for unit and integration tests.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{password, session},
    config::{Config, DatabaseConfig, EmailTransportConfig, PoolSettings},
    db::{
        handlers::{Accounts, Profiles, Repository, UserLevels},
        models::{
            accounts::{AccountCreateDBRequest, AccountDBResponse, AccountStatus},
            profiles::ProfileFields,
            user_levels::UserLevelUpsertDBRequest,
        },
    },
    locations::LocationDirectory,
};

/// Password of every account made by [`create_test_account`].
pub const TEST_PASSWORD: &str = "Passw0rdTest";

/// bcrypt's minimum cost keeps hashing fast in tests.
const TEST_BCRYPT_COST: u32 = 4;

pub fn create_test_config() -> Config {
    // Use temp directory for test emails
    let email_dir = std::env::temp_dir().join(format!("dromic-test-emails-{}", std::process::id()));

    let mut config = Config {
        database: DatabaseConfig {
            url: Some("postgres://localhost/dromic_test".to_string()),
            pool: PoolSettings {
                max_connections: 2,
                min_connections: 0,
                ..Default::default()
            },
        },
        secret_key: Some("test-secret-key-with-at-least-32-characters".to_string()),
        enable_metrics: false,
        ..Default::default()
    };
    config.auth.password.bcrypt_cost = TEST_BCRYPT_COST;
    config.email.transport = EmailTransportConfig::File {
        path: email_dir.to_string_lossy().to_string(),
    };
    config
}

pub fn create_test_state(pool: PgPool, config: Config) -> AppState {
    let locations = LocationDirectory::load_embedded().expect("embedded PSGC data should parse");
    AppState::builder().db(pool).config(config).locations(Arc::new(locations)).build()
}

/// Upsert the DSWD user levels, as seeding would.
pub async fn seed_test_user_levels(pool: &PgPool) {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    for (position, abbreviation, rank, permissions) in crate::seed::user_levels() {
        UserLevels::new(&mut conn)
            .upsert(&UserLevelUpsertDBRequest {
                position: position.to_string(),
                abbreviation: abbreviation.to_string(),
                rank,
                permissions,
            })
            .await
            .expect("Failed to upsert user level");
    }
}

/// An active Field Officer whose password is [`TEST_PASSWORD`].
///
/// User levels must already exist, from [`seed_test_user_levels`] or a seed run.
pub async fn create_test_account(pool: &PgPool, username: &str, email: &str) -> AccountDBResponse {
    let mut tx = pool.begin().await.expect("Failed to begin transaction");

    let level = UserLevels::new(&mut tx)
        .get_active_by_position("Field Officer")
        .await
        .expect("Failed to look up user level");

    let profile = Profiles::new(&mut tx)
        .create(&ProfileFields {
            first_name: "Test".to_string(),
            last_name: "Tester".to_string(),
            phone_number: Some("09171234567".to_string()),
            address: Some("1 Test Street".to_string()),
            job_title: Some("Social Worker".to_string()),
            region: Some("Region I".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to create test profile");

    let password_hash = password::hash_password(TEST_PASSWORD, TEST_BCRYPT_COST).expect("Failed to hash test password");

    let account = Accounts::new(&mut tx)
        .create(&AccountCreateDBRequest {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            status: AccountStatus::Active,
            profile_id: profile.id,
            user_level_id: level.map(|l| l.id),
            email_verified: true,
            terms_accepted: true,
            privacy_policy_accepted: true,
        })
        .await
        .expect("Failed to create test account");

    tx.commit().await.expect("Failed to commit test account");
    account
}

/// `Cookie` header value carrying a fresh session for `account`.
pub fn session_cookie_for(account: &AccountDBResponse, config: &Config) -> String {
    let user = CurrentUser::new_session(account, None);
    let token = session::create_session_token(&user, config).expect("Failed to create session token");
    format!("{}={}", config.auth.session.cookie_name, token)
}
