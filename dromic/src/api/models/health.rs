//! Health report returned by `GET /api/health`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseService {
    Connected,
    Disconnected,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApiService {
    Operational,
    Degraded,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticationService {
    Active,
    Inactive,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExternalServices {
    Available,
    Limited,
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthServices {
    pub database: DatabaseService,
    pub api: ApiService,
    pub authentication: AuthenticationService,
    pub external_services: ExternalServices,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct HealthChecks {
    pub database_query: bool,
    pub jwt_secret: bool,
    pub environment_vars: bool,
    pub psgc_data: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct HealthMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub response_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub environment: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started
    pub uptime: f64,
    pub services: HealthServices,
    pub checks: HealthChecks,
    pub metadata: HealthMetadata,
}

/// State of the embedded location reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationData {
    Loaded,
    Empty,
    Failed,
}

/// Raw check results fed into [`assess`].
#[derive(Debug, Clone)]
pub struct HealthSignals {
    pub database_ok: bool,
    pub secret_ok: bool,
    /// Names of required settings that are not configured
    pub missing_config: Vec<&'static str>,
    pub locations: LocationData,
}

/// The verdict of a health check: status, service states, checks and warnings.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub status: HealthStatus,
    pub services: HealthServices,
    pub checks: HealthChecks,
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

/// A database failure makes the service unhealthy; anything else that is missing only
/// degrades it.
pub fn assess(signals: &HealthSignals) -> Assessment {
    let mut warnings = Vec::new();
    let mut error = None;

    if !signals.database_ok {
        error = Some("Database connection failed".to_string());
    }
    if !signals.secret_ok {
        warnings.push("JWT_SECRET is not set or too short".to_string());
    }
    if !signals.missing_config.is_empty() {
        warnings.push(format!("Missing environment variables: {}", signals.missing_config.join(", ")));
    }
    match signals.locations {
        LocationData::Loaded => {}
        LocationData::Empty => warnings.push("PSGC data appears to be empty".to_string()),
        LocationData::Failed => warnings.push("PSGC data import failed".to_string()),
    }

    let status = if !signals.database_ok {
        HealthStatus::Unhealthy
    } else if !warnings.is_empty() {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    Assessment {
        status,
        services: HealthServices {
            database: if signals.database_ok {
                DatabaseService::Connected
            } else {
                DatabaseService::Error
            },
            api: ApiService::Operational,
            authentication: if signals.secret_ok {
                AuthenticationService::Active
            } else {
                AuthenticationService::Inactive
            },
            external_services: ExternalServices::Available,
        },
        checks: HealthChecks {
            database_query: signals.database_ok,
            jwt_secret: signals.secret_ok,
            environment_vars: signals.missing_config.is_empty(),
            psgc_data: signals.locations == LocationData::Loaded,
        },
        error,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy_signals() -> HealthSignals {
        HealthSignals {
            database_ok: true,
            secret_ok: true,
            missing_config: vec![],
            locations: LocationData::Loaded,
        }
    }

    #[test]
    fn test_all_checks_pass() {
        let a = assess(&healthy_signals());
        assert_eq!(a.status, HealthStatus::Healthy);
        assert!(a.warnings.is_empty());
        assert!(a.checks.database_query && a.checks.jwt_secret && a.checks.environment_vars && a.checks.psgc_data);
    }

    #[test]
    fn test_database_failure_is_unhealthy() {
        let signals = HealthSignals {
            database_ok: false,
            secret_ok: false,
            ..healthy_signals()
        };
        let a = assess(&signals);
        assert_eq!(a.status, HealthStatus::Unhealthy);
        assert_eq!(a.services.database, DatabaseService::Error);
        assert!(a.error.is_some());
    }

    #[test]
    fn test_weak_secret_degrades() {
        let a = assess(&HealthSignals {
            secret_ok: false,
            ..healthy_signals()
        });
        assert_eq!(a.status, HealthStatus::Degraded);
        assert_eq!(a.services.authentication, AuthenticationService::Inactive);
        assert!(!a.checks.jwt_secret);
    }

    #[test]
    fn test_location_data_problems_degrade() {
        for locations in [LocationData::Empty, LocationData::Failed] {
            let a = assess(&HealthSignals {
                locations,
                ..healthy_signals()
            });
            assert_eq!(a.status, HealthStatus::Degraded);
            assert!(!a.checks.psgc_data);
        }
    }

    #[test]
    fn test_missing_config_listed() {
        let a = assess(&HealthSignals {
            missing_config: vec!["DATABASE_URL", "JWT_SECRET"],
            ..healthy_signals()
        });
        assert_eq!(a.status, HealthStatus::Degraded);
        assert_eq!(a.warnings, ["Missing environment variables: DATABASE_URL, JWT_SECRET"]);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HealthStatus::Degraded).unwrap(), "\"degraded\"");
    }
}
