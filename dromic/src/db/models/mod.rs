//! Database record models matching table schemas.
//!
//! Each model struct matches a table row and derives `sqlx::FromRow`. Status columns are
//! `VARCHAR` guarded by `CHECK` constraints; they decode into enums through
//! `#[sqlx(try_from = "String")]` and bind with `as_str()`.
//!
//! - [`accounts`]: credentials, status and lockout counters
//! - [`profiles`]: personal and location attributes
//! - [`user_levels`]: positions in the DSWD hierarchy
//! - [`activity_logs`]: append-only audit trail
//! - [`incidents`], [`evacuation_centers`], [`assistance_records`]: disaster records
//! - [`system_settings`], [`notifications`]: configuration and per-user alerts

pub mod accounts;
pub mod activity_logs;
pub mod assistance_records;
pub mod evacuation_centers;
pub mod incidents;
pub mod notifications;
pub mod profiles;
pub mod system_settings;
pub mod user_levels;
