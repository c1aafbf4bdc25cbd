//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed `PgConnection` (a pooled connection or an open
//! transaction) and exposes typed operations for one table. Tables with a full lifecycle
//! implement the [`Repository`] trait; reference and read-side tables expose only the
//! queries the API needs.
//!
//! # Usage
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let mut accounts = Accounts::new(&mut tx);
//! let account = accounts.get_by_login_identifier("admin").await?;
//! tx.commit().await?;
//! ```

pub mod accounts;
pub mod activity_logs;
pub mod assistance_records;
pub mod evacuation_centers;
pub mod incidents;
pub mod notifications;
pub mod profiles;
pub mod repository;
pub mod system_settings;
pub mod user_levels;

pub use accounts::Accounts;
pub use activity_logs::ActivityLogs;
pub use assistance_records::AssistanceRecords;
pub use evacuation_centers::EvacuationCenters;
pub use incidents::Incidents;
pub use notifications::Notifications;
pub use profiles::Profiles;
pub use repository::Repository;
pub use system_settings::SystemSettings;
pub use user_levels::UserLevels;
