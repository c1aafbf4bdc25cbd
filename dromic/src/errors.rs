//! Service-level error type returned by every handler.
//!
//! [`Error`] carries enough context to pick a status code, a caller-safe message and a log
//! level. Responses are always JSON: `{"error": "..."}`, plus a `details` array of
//! [`FieldError`]s for validation failures so a form can mark each offending input.
//!
//! Database errors keep their classification from [`DbError`]. Constraint failures map to
//! 400 or 409 with a generic message, while pool and driver failures become a bare
//! "Internal server error". The full chain of a 5xx is logged at `error`, constraint and
//! conflict errors at `warn`, authentication outcomes at `info` and caller mistakes at
//! `debug`.

use crate::db::errors::DbError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error as ThisError;
use utoipa::ToSchema;

/// A single failed validation rule, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors a request can end in.
///
/// `Locked` (423) is distinct from `Forbidden` (403) so the login form can tell a temporary
/// lockout apart from a deactivated account.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required, or credentials rejected
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Authenticated (or identified) but not allowed, e.g. an inactive account
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Account temporarily locked after repeated failed logins
    #[error("Account locked")]
    Locked { message: String },

    /// Request body failed field-level validation
    #[error("Validation failed")]
    Validation { errors: Vec<FieldError> },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Not found, with a caller-facing message instead of a resource id
    #[error("{message}")]
    Missing { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// Conflict error, e.g. a username already taken by another account
    #[error("Conflict: {message}")]
    Conflict { message: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::Locked { .. } => StatusCode::LOCKED,
            Error::Validation { .. } | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } | Error::Missing { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::ProtectedEntity { .. } => StatusCode::FORBIDDEN,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details.
    ///
    /// Unique violations on `account` are the one case where the constraint name shapes the
    /// message; every other database failure gets a fixed string.
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::Forbidden { message } | Error::Locked { message } | Error::Missing { message } => message.clone(),
            Error::Validation { .. } => "Validation failed".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, table, .. } => match (table.as_deref(), constraint.as_deref()) {
                    (Some("account"), Some(c)) if c.contains("email") || c.contains("username") => {
                        "Username or email already exists".to_string()
                    }
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::ProtectedEntity {
                    operation, entity_type, ..
                } => {
                    format!("Cannot {operation} {entity_type}")
                }
                DbError::Other(_) => "Internal server error".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
            Error::Conflict { message } => message.clone(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) | Error::Conflict { .. } => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::Forbidden { .. } | Error::Locked { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Validation { .. } | Error::BadRequest { .. } | Error::NotFound { .. } | Error::Missing { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = match &self {
            Error::Validation { errors } => json!({
                "error": self.user_message(),
                "details": errors,
            }),
            _ => json!({ "error": self.user_message() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::Locked {
                message: "locked".to_string()
            }
            .status_code()
            .as_u16(),
            423
        );
        assert_eq!(
            Error::Forbidden {
                message: "inactive".to_string()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(Error::Validation { errors: vec![] }.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::Database(DbError::NotFound).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let err = Error::Internal {
            operation: "connect to postgres at 10.0.0.5".to_string(),
        };
        assert_eq!(err.user_message(), "Internal server error");

        let err = Error::Other(anyhow::anyhow!("secret detail"));
        assert_eq!(err.user_message(), "Internal server error");
    }

    #[test]
    fn test_account_unique_violation_message() {
        let err = Error::Database(DbError::UniqueViolation {
            constraint: Some("account_email_key".to_string()),
            table: Some("account".to_string()),
            message: "duplicate key".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "Username or email already exists");
    }

    #[tokio::test]
    async fn test_validation_response_lists_fields() {
        let err = Error::Validation {
            errors: vec![
                FieldError::new("email", "Invalid email address"),
                FieldError::new("password", "Password must be at least 8 characters"),
            ],
        };

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["details"][0]["field"], "email");
        assert_eq!(json["details"][1]["message"], "Password must be at least 8 characters");
    }
}
