//! Errors raised by the repositories in [`crate::db::handlers`].
//!
//! [`DbError`] sorts raw `sqlx` failures into the cases handlers react to differently. The
//! constraint variants keep the constraint and table names Postgres reports, which lets
//! [`crate::errors::Error::user_message`] say "Username or email already exists" for the
//! `account` unique indexes without exposing SQL text. Anything that is not a recognised
//! constraint failure (connection loss, pool timeouts, syntax errors) lands in
//! [`DbError::Other`] and surfaces as a 500.

use crate::types::Operation;
use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Check constraint violation
    #[error("Check constraint violation")]
    CheckViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Entity cannot be modified or deleted due to storage-level rules.
    ///
    /// Reserved for protection enforced by the storage layer itself. The activity log is the
    /// case in point: a trigger rejects every `UPDATE` and `DELETE` on `activity_log`, and the
    /// repository refuses both operations up front with this variant rather than letting the
    /// trigger's exception come back as [`DbError::Other`]. Per-user authorization belongs in
    /// the API layer, not here.
    #[error("{operation} cannot be applied to entity of type {entity_type}: {reason}")]
    ProtectedEntity {
        operation: Operation,
        reason: String,
        entity_type: String,
        entity_id: Option<String>,
    },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Classify by SQLSTATE class: unique (23505), foreign key (23503) and check (23514)
/// violations get their own variants, `RowNotFound` becomes [`DbError::NotFound`].
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().map(|s| s.to_string());
                let table = db_err.table().map(|s| s.to_string());
                let message = db_err.message().to_string();

                if db_err.is_unique_violation() {
                    DbError::UniqueViolation { constraint, table, message }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation { constraint, table, message }
                } else if db_err.is_check_violation() {
                    DbError::CheckViolation { constraint, table, message }
                } else {
                    DbError::Other(anyhow::Error::from(err))
                }
            }
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::NotFound));
    }

    #[test]
    fn test_pool_errors_are_other() {
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::Other(_)));
    }

    #[test]
    fn test_protected_entity_message() {
        let err = DbError::ProtectedEntity {
            operation: Operation::Delete,
            reason: "activity log entries are append-only".to_string(),
            entity_type: "activity_log".to_string(),
            entity_id: None,
        };
        assert_eq!(
            err.to_string(),
            "delete cannot be applied to entity of type activity_log: activity log entries are append-only"
        );
    }
}
