//! Failed-login lockout policy.
//!
//! The counter itself lives in `account.failed_login_attempts` and is advanced by a single
//! `UPDATE` (see [`Accounts::record_failed_login`](crate::db::handlers::Accounts::record_failed_login)).
//! This module decides what the stored values mean.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::{config::LockoutConfig, db::models::accounts::FailedLoginUpdate};

#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Failures that trigger a lock
    pub max_failed_attempts: i32,
    /// How long a lock lasts
    pub duration: Duration,
    /// Failures at which the audit entry is flagged as a security alert
    pub alert_threshold: i32,
}

impl From<&LockoutConfig> for LockoutPolicy {
    fn from(config: &LockoutConfig) -> Self {
        Self {
            max_failed_attempts: config.max_failed_attempts,
            duration: config.duration,
            alert_threshold: config.alert_threshold,
        }
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::from(&LockoutConfig::default())
    }
}

/// Whether a stored `account_locked_until` still blocks logins at `now`.
pub fn is_locked(locked_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    locked_until.is_some_and(|until| until > now)
}

/// What a failed password attempt did to the account, as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureOutcome {
    pub previous_failed_attempts: i32,
    pub failed_attempts: i32,
    pub account_locked: bool,
    pub locked_until: Option<DateTime<Utc>>,
    pub security_alert: bool,
    pub lockout_threshold: i32,
}

impl LockoutPolicy {
    /// Interpret the row returned by the failed-login update.
    pub fn outcome(&self, update: &FailedLoginUpdate, now: DateTime<Utc>) -> FailureOutcome {
        let account_locked = update.failed_login_attempts >= self.max_failed_attempts && is_locked(update.account_locked_until, now);

        FailureOutcome {
            previous_failed_attempts: update.failed_login_attempts - 1,
            failed_attempts: update.failed_login_attempts,
            account_locked,
            locked_until: account_locked.then_some(update.account_locked_until).flatten(),
            security_alert: update.failed_login_attempts >= self.alert_threshold,
            lockout_threshold: self.max_failed_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(attempts: i32, locked_until: Option<DateTime<Utc>>) -> FailedLoginUpdate {
        FailedLoginUpdate {
            failed_login_attempts: attempts,
            account_locked_until: locked_until,
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.max_failed_attempts, 5);
        assert_eq!(policy.duration, Duration::from_secs(15 * 60));
        assert_eq!(policy.alert_threshold, 3);
    }

    #[test]
    fn test_is_locked() {
        let now = Utc::now();
        assert!(!is_locked(None, now));
        assert!(!is_locked(Some(now - chrono::Duration::seconds(1)), now));
        assert!(is_locked(Some(now + chrono::Duration::minutes(15)), now));
    }

    #[test]
    fn test_outcome_below_threshold() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();

        let outcome = policy.outcome(&update(2, None), now);
        assert_eq!(outcome.previous_failed_attempts, 1);
        assert!(!outcome.account_locked);
        assert!(!outcome.security_alert);

        let outcome = policy.outcome(&update(3, None), now);
        assert!(outcome.security_alert);
        assert!(!outcome.account_locked);
    }

    #[test]
    fn test_outcome_at_threshold_locks() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();
        let until = now + chrono::Duration::minutes(15);

        let outcome = policy.outcome(&update(5, Some(until)), now);
        assert!(outcome.account_locked);
        assert_eq!(outcome.locked_until, Some(until));
        assert_eq!(outcome.lockout_threshold, 5);
    }

    #[test]
    fn test_stale_lock_is_not_reported() {
        // A lock left over from an earlier window does not count as freshly locked
        let policy = LockoutPolicy::default();
        let now = Utc::now();
        let outcome = policy.outcome(&update(2, Some(now - chrono::Duration::hours(1))), now);
        assert!(!outcome.account_locked);
        assert_eq!(outcome.locked_until, None);
    }
}
