//! Reference and sample data.
//!
//! Seeding runs in one transaction: the nine DSWD user levels, the default administrator,
//! the system settings and, when `seed.sample_data` is set, three sample incidents,
//! evacuation centers and assistance records. It is skipped when user levels already exist
//! unless forced with `--reseed`; a forced run upserts and leaves an existing administrator
//! untouched.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument, warn};

use crate::{
    auth::password,
    config::Config,
    db::{
        handlers::{Accounts, Profiles, Repository, SystemSettings, UserLevels},
        models::{
            accounts::{AccountCreateDBRequest, AccountStatus},
            profiles::ProfileFields,
            system_settings::SystemSettingUpsertDBRequest,
            user_levels::UserLevelUpsertDBRequest,
        },
    },
    types::{AccountId, IncidentId},
};

/// Row counts after a seed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub user_levels: i64,
    pub accounts: i64,
    pub settings: i64,
    pub incidents: i64,
    pub evacuation_centers: i64,
    pub assistance_records: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// User levels already existed and the run was not forced
    Skipped,
    Seeded(SeedSummary),
}

/// `(position, abbreviation, rank, permissions)`, most senior first.
pub(crate) fn user_levels() -> Vec<(&'static str, &'static str, i32, Value)> {
    vec![
        (
            "Super Admin",
            "SA",
            9,
            json!({"all": true, "system_admin": true, "user_management": true, "incident_management": true, "reports": true, "settings": true}),
        ),
        (
            "Admin",
            "ADMIN",
            8,
            json!({"user_management": true, "incident_management": true, "evacuation_management": true, "assistance_management": true, "reports": true}),
        ),
        (
            "Director",
            "DIR",
            7,
            json!({"incident_management": true, "evacuation_management": true, "assistance_management": true, "reports": true, "approve_assistance": true}),
        ),
        (
            "Regional Director",
            "RD",
            6,
            json!({"incident_management": true, "evacuation_management": true, "assistance_management": true, "reports": true, "regional_oversight": true}),
        ),
        (
            "Secretary",
            "SEC",
            5,
            json!({"incident_management": true, "evacuation_management": true, "assistance_management": true, "reports": true}),
        ),
        (
            "Central Officer",
            "CO",
            4,
            json!({"incident_management": true, "evacuation_management": true, "assistance_management": true, "reports": true}),
        ),
        (
            "Field Officer",
            "FO",
            3,
            json!({"incident_reporting": true, "evacuation_reporting": true, "assistance_distribution": true, "field_reports": true}),
        ),
        (
            "Team Leader",
            "TL",
            2,
            json!({"incident_reporting": true, "evacuation_reporting": true, "team_management": true}),
        ),
        (
            "Local Government Unit",
            "LGU",
            1,
            json!({"incident_reporting": true, "local_coordination": true, "evacuation_coordination": true}),
        ),
    ]
}

fn system_settings() -> Vec<SystemSettingUpsertDBRequest> {
    let setting = |key: &str, value: Value, description: &str, category: &str, is_public: bool| SystemSettingUpsertDBRequest {
        setting_key: key.to_string(),
        setting_value: value,
        description: Some(description.to_string()),
        category: category.to_string(),
        is_public,
    };

    vec![
        setting("app_name", json!({"value": "DROMIC-IS"}), "Application name displayed in the UI", "general", true),
        setting(
            "app_version",
            json!({"value": env!("CARGO_PKG_VERSION")}),
            "Current application version",
            "general",
            true,
        ),
        setting(
            "maintenance_mode",
            json!({"enabled": false, "message": "System is under maintenance"}),
            "Maintenance mode configuration",
            "system",
            false,
        ),
        setting(
            "notification_settings",
            json!({"email_enabled": true, "sms_enabled": false, "push_enabled": true, "default_priority": "Medium"}),
            "Global notification settings",
            "notifications",
            false,
        ),
        setting(
            "security_settings",
            json!({
                "password_min_length": 8,
                "password_require_uppercase": true,
                "password_require_lowercase": true,
                "password_require_numbers": true,
                "password_require_symbols": false,
                "max_login_attempts": 5,
                "lockout_duration_minutes": 15,
                "session_timeout_minutes": 30,
            }),
            "Security and authentication settings",
            "security",
            false,
        ),
        setting(
            "incident_types",
            json!({"types": [
                "Typhoon", "Flood", "Earthquake", "Landslide", "Fire", "Volcanic Eruption", "Drought",
                "El Niño", "La Niña", "Storm Surge", "Tsunami", "Other Natural Disaster",
                "Man-made Disaster", "Health Emergency", "Transportation Accident",
            ]}),
            "Available incident types for reporting",
            "incidents",
            true,
        ),
        setting(
            "assistance_types",
            json!({"types": [
                "Food Packs", "Relief Goods", "Cash Assistance", "Medical Assistance", "Shelter Materials",
                "Clothing", "Hygiene Kits", "Kitchen Utensils", "Sleeping Materials", "Educational Supplies",
                "Livelihood Assistance", "Psychosocial Support", "Emergency Shelter", "Temporary Shelter",
                "Other Assistance",
            ]}),
            "Available assistance types for distribution",
            "assistance",
            true,
        ),
        setting(
            "dashboard_refresh_interval",
            json!({"seconds": 30}),
            "Dashboard auto-refresh interval in seconds",
            "ui",
            true,
        ),
    ]
}

struct Place {
    region: &'static str,
    province: &'static str,
    city: &'static str,
    barangay: &'static str,
    lat: f64,
    lng: f64,
}

const LAOAG: Place = Place {
    region: "Region I",
    province: "Ilocos Norte",
    city: "Laoag City",
    barangay: "San Lorenzo",
    lat: 18.1969,
    lng: 120.5936,
};

const QUEZON_CITY: Place = Place {
    region: "NCR",
    province: "Metro Manila",
    city: "Quezon City",
    barangay: "Commonwealth",
    lat: 14.6760,
    lng: 121.0437,
};

const DIGOS: Place = Place {
    region: "Region XI",
    province: "Davao del Sur",
    city: "Digos City",
    barangay: "Zone 1",
    lat: 6.7496,
    lng: 125.3545,
};

/// Seed reference data, the administrator and (optionally) sample records.
#[instrument(skip_all, fields(force = force))]
pub async fn run(db: &PgPool, config: &Config, force: bool) -> anyhow::Result<SeedOutcome> {
    let mut tx = db.begin().await?;

    let existing_levels = UserLevels::new(&mut tx).count().await?;
    if existing_levels > 0 && !force {
        info!(existing_levels, "User levels already present, skipping seed (use --reseed to force)");
        tx.commit().await?;
        return Ok(SeedOutcome::Skipped);
    }
    if existing_levels > 0 {
        warn!("Reseeding existing reference data");
    }

    let mut super_admin_level = None;
    for (position, abbreviation, rank, permissions) in user_levels() {
        let level = UserLevels::new(&mut tx)
            .upsert(&UserLevelUpsertDBRequest {
                position: position.to_string(),
                abbreviation: abbreviation.to_string(),
                rank,
                permissions,
            })
            .await?;
        if rank == 9 {
            super_admin_level = Some(level.id);
        }
    }

    let admin_id = ensure_admin(&mut tx, config, super_admin_level).await?;

    for setting in system_settings() {
        SystemSettings::new(&mut tx).upsert(&setting).await?;
    }
    sqlx::query("UPDATE system_settings SET updated_by = $1 WHERE updated_by IS NULL")
        .bind(admin_id)
        .execute(&mut *tx)
        .await?;

    if config.seed.sample_data {
        let incident_ids = seed_incidents(&mut tx, admin_id).await?;
        seed_evacuation_centers(&mut tx, admin_id).await?;
        seed_assistance_records(&mut tx, admin_id, &incident_ids).await?;
    }

    let summary = summarize(&mut tx).await?;
    tx.commit().await?;

    info!(?summary, "Database seeded");
    Ok(SeedOutcome::Seeded(summary))
}

/// The configured administrator, created as a Super Admin when absent.
async fn ensure_admin(conn: &mut PgConnection, config: &Config, level: Option<uuid::Uuid>) -> anyhow::Result<AccountId> {
    let seed = &config.seed;
    let mut accounts = Accounts::new(&mut *conn);
    if let Some(existing) = accounts.get_by_login_identifier(&seed.admin_username).await? {
        info!(username = %existing.username, "Administrator already exists");
        return Ok(existing.id);
    }
    if let Some(existing) = accounts.get_by_login_identifier(&seed.admin_email).await? {
        info!(username = %existing.username, "Administrator already exists");
        return Ok(existing.id);
    }

    let password_hash = password::hash_password_blocking(seed.admin_password.clone(), config.auth.password.bcrypt_cost).await?;

    let profile = Profiles::new(&mut *conn)
        .create(&ProfileFields {
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            phone_number: Some("09171234567".to_string()),
            address: Some("DSWD Central Office".to_string()),
            job_title: Some("System Administrator".to_string()),
            region: Some("NCR".to_string()),
            province: Some("Metro Manila".to_string()),
            city: Some("Manila".to_string()),
            barangay: Some("Ermita".to_string()),
            ..Default::default()
        })
        .await?;

    let admin = Accounts::new(&mut *conn)
        .create(&AccountCreateDBRequest {
            username: seed.admin_username.clone(),
            email: seed.admin_email.clone(),
            password_hash,
            status: AccountStatus::Active,
            profile_id: profile.id,
            user_level_id: level,
            email_verified: true,
            terms_accepted: true,
            privacy_policy_accepted: true,
        })
        .await?;

    warn!(
        username = %admin.username,
        "Created default administrator; change its password after first login"
    );
    Ok(admin.id)
}

async fn seed_incidents(conn: &mut PgConnection, admin_id: AccountId) -> anyhow::Result<Vec<IncidentId>> {
    let now = Utc::now();
    // (code, type, name, description, severity, status, place, families, persons, casualties, days ago)
    let incidents = [
        (
            "TY-2024-001",
            "Typhoon",
            "Typhoon Kristine",
            "Strong typhoon affecting northern regions with sustained winds of 150 km/h",
            "High",
            "Active",
            LAOAG,
            150,
            600,
            json!({"dead": 0, "injured": 5, "missing": 1}),
            3,
        ),
        (
            "FL-2024-002",
            "Flood",
            "Metro Manila Flash Flood",
            "Heavy rainfall causing flash floods in low-lying areas",
            "Medium",
            "Monitoring",
            QUEZON_CITY,
            85,
            340,
            json!({"dead": 0, "injured": 2, "missing": 0}),
            2,
        ),
        (
            "EQ-2024-003",
            "Earthquake",
            "Mindanao Earthquake",
            "6.2 magnitude earthquake with epicenter in Davao Region",
            "High",
            "Resolved",
            DIGOS,
            200,
            800,
            json!({"dead": 1, "injured": 15, "missing": 0}),
            6,
        ),
    ];

    let mut ids = Vec::with_capacity(incidents.len());
    for (code, kind, name, description, severity, status, place, families, persons, casualties, days_ago) in incidents {
        let occurred = now - Duration::days(days_ago);
        let id: IncidentId = sqlx::query_scalar(
            "INSERT INTO incidents (incident_code, incident_type, incident_name, description, severity_level, status, \
                 region, province, city, barangay, coordinates, reported_by, date_occurred, date_reported, \
                 affected_families, affected_persons, casualties) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             ON CONFLICT (incident_code) DO UPDATE SET incident_name = EXCLUDED.incident_name \
             RETURNING id",
        )
        .bind(code)
        .bind(kind)
        .bind(name)
        .bind(description)
        .bind(severity)
        .bind(status)
        .bind(place.region)
        .bind(place.province)
        .bind(place.city)
        .bind(place.barangay)
        .bind(json!({"lat": place.lat, "lng": place.lng}))
        .bind(admin_id)
        .bind(occurred)
        .bind(occurred + Duration::hours(6))
        .bind(families)
        .bind(persons)
        .bind(casualties)
        .fetch_one(&mut *conn)
        .await?;
        ids.push(id);
    }

    Ok(ids)
}

async fn seed_evacuation_centers(conn: &mut PgConnection, admin_id: AccountId) -> anyhow::Result<()> {
    let now = Utc::now();
    // (name, type, capacity, occupancy, place, address, facilities, contact, number)
    let centers = [
        (
            "Laoag City Central School",
            "School",
            500,
            120,
            LAOAG,
            "General Luna St, Laoag City, Ilocos Norte",
            json!(["Classrooms", "Restrooms", "Kitchen", "Medical Station"]),
            "Maria Santos",
            "09171234567",
        ),
        (
            "Commonwealth Elementary School",
            "School",
            300,
            75,
            QUEZON_CITY,
            "Commonwealth Avenue, Quezon City",
            json!(["Classrooms", "Restrooms", "Cafeteria"]),
            "Juan Cruz",
            "09181234567",
        ),
        (
            "Digos City Gymnasium",
            "Gymnasium",
            800,
            150,
            DIGOS,
            "Rizal Avenue, Digos City, Davao del Sur",
            json!(["Basketball Court", "Restrooms", "Stage", "Storage"]),
            "Pedro Mendoza",
            "09191234567",
        ),
    ];

    for (name, kind, capacity, occupancy, place, address, facilities, contact, number) in centers {
        sqlx::query(
            "INSERT INTO evacuation_centers (center_name, center_type, capacity, current_occupancy, region, province, \
                 city, barangay, complete_address, coordinates, facilities, contact_person, contact_number, managed_by, \
                 status, opened_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 'Available', $15) \
             ON CONFLICT (center_name) DO NOTHING",
        )
        .bind(name)
        .bind(kind)
        .bind(capacity)
        .bind(occupancy)
        .bind(place.region)
        .bind(place.province)
        .bind(place.city)
        .bind(place.barangay)
        .bind(address)
        .bind(json!({"lat": place.lat, "lng": place.lng}))
        .bind(facilities)
        .bind(contact)
        .bind(number)
        .bind(admin_id)
        .bind(now - Duration::days(2))
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn seed_assistance_records(conn: &mut PgConnection, admin_id: AccountId, incident_ids: &[IncidentId]) -> anyhow::Result<()> {
    let now = Utc::now();
    // (code, head, members, type, details, amount, quantity, place, address, status)
    let records = [
        (
            "AST-2024-001",
            "Roberto Dela Cruz",
            5,
            "Food Packs",
            json!({"items": ["Rice", "Canned Goods", "Noodles"], "packs": 2}),
            Decimal::ZERO,
            2,
            LAOAG,
            "Purok 1, San Lorenzo, Laoag City",
            "Distributed",
        ),
        (
            "AST-2024-002",
            "Maria Garcia",
            3,
            "Cash Assistance",
            json!({"purpose": "Emergency Relief", "category": "Immediate"}),
            Decimal::new(500000, 2),
            1,
            QUEZON_CITY,
            "Block 5, Commonwealth, Quezon City",
            "Approved",
        ),
        (
            "AST-2024-003",
            "Antonio Reyes",
            7,
            "Relief Goods",
            json!({"items": ["Blankets", "Clothing", "Hygiene Kits"]}),
            Decimal::ZERO,
            3,
            DIGOS,
            "Rizal Street, Zone 1, Digos City",
            "Completed",
        ),
    ];

    for (index, (code, head, members, kind, details, amount, quantity, place, address, status)) in records.into_iter().enumerate() {
        // Pair each record with the incident at the same position
        let incident_id = incident_ids.get(index).or(incident_ids.first()).copied();
        let distributed_at = (status == "Distributed").then(|| now - Duration::days(1));

        sqlx::query(
            "INSERT INTO assistance_records (record_code, incident_id, family_head_name, family_members, assistance_type, \
                 assistance_details, amount, quantity, region, province, city, barangay, beneficiary_address, \
                 distributed_by, status, distribution_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             ON CONFLICT (record_code) DO NOTHING",
        )
        .bind(code)
        .bind(incident_id)
        .bind(head)
        .bind(members)
        .bind(kind)
        .bind(details)
        .bind(amount)
        .bind(quantity)
        .bind(place.region)
        .bind(place.province)
        .bind(place.city)
        .bind(place.barangay)
        .bind(address)
        .bind(admin_id)
        .bind(status)
        .bind(distributed_at)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn summarize(conn: &mut PgConnection) -> anyhow::Result<SeedSummary> {
    let tables = ["user_level", "account", "system_settings", "incidents", "evacuation_centers", "assistance_records"];
    let mut counts = [0i64; 6];
    for (table, count) in tables.iter().zip(counts.iter_mut()) {
        *count = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&mut *conn)
            .await?;
    }
    let [user_levels, accounts, settings, incidents, evacuation_centers, assistance_records] = counts;

    Ok(SeedSummary {
        user_levels,
        accounts,
        settings,
        incidents,
        evacuation_centers,
        assistance_records,
    })
}
