//! Health report for load balancers and monitoring.

use std::time::Instant;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{error, warn};

use crate::{
    AppState,
    api::models::health::{HealthMetadata, HealthSignals, HealthResponse, HealthStatus, LocationData, assess},
};

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store, must-revalidate"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers
}

/// Check the database, configuration and location data.
///
/// Answers 503 only when the database is unreachable; other failures are reported as
/// `degraded` with a 200.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Healthy or degraded", body = HealthResponse),
        (status = 503, description = "Database unavailable", body = HealthResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();

    let database_ok = match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => true,
        Err(e) => {
            error!(error = %e, "Health check database query failed");
            false
        }
    };

    let mut missing_config = Vec::new();
    if state.config.database.url.is_none() {
        missing_config.push("DATABASE_URL");
    }
    if state.config.secret_key.is_none() {
        missing_config.push("JWT_SECRET");
    }

    let locations = match state.locations.as_deref() {
        None => LocationData::Failed,
        Some(directory) if directory.is_empty() => LocationData::Empty,
        Some(_) => LocationData::Loaded,
    };

    let assessment = assess(&HealthSignals {
        database_ok,
        secret_ok: state.config.has_strong_secret(),
        missing_config,
        locations,
    });
    if assessment.status == HealthStatus::Degraded {
        warn!(warnings = ?assessment.warnings, "Service degraded");
    }

    let status_code = match assessment.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };

    let body = HealthResponse {
        status: assessment.status,
        environment: state.config.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        services: assessment.services,
        checks: assessment.checks,
        metadata: HealthMetadata {
            error: assessment.error,
            warnings: assessment.warnings,
            response_time_ms: started.elapsed().as_millis() as u64,
        },
    };

    (status_code, no_cache_headers(), Json(body))
}

/// Plain liveness check.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses((status = 200, description = "Process is up", body = String))
)]
pub async fn healthz() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::health::{AuthenticationService, DatabaseService, HealthResponse, HealthStatus},
        test_utils::{create_test_config, create_test_state},
    };
    use axum_test::TestServer;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_health_reports_healthy(pool: PgPool) {
        let server = TestServer::new(crate::build_router(create_test_state(pool, create_test_config()))).unwrap();

        let response = server.get("/api/health").await;
        response.assert_status_ok();
        assert_eq!(
            response.headers().get("cache-control").unwrap(),
            "no-cache, no-store, must-revalidate"
        );
        let body: HealthResponse = response.json();
        assert_eq!(body.status, HealthStatus::Healthy);
        assert_eq!(body.services.database, DatabaseService::Connected);
        assert!(body.checks.database_query);
        assert!(body.checks.psgc_data);
        assert!(body.metadata.warnings.is_empty());
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[sqlx::test]
    async fn test_missing_secret_degrades(pool: PgPool) {
        let mut config = create_test_config();
        config.secret_key = None;
        let server = TestServer::new(crate::build_router(create_test_state(pool, config))).unwrap();

        let response = server.get("/api/health").await;
        response.assert_status_ok();
        let body: HealthResponse = response.json();
        assert_eq!(body.status, HealthStatus::Degraded);
        assert_eq!(body.services.authentication, AuthenticationService::Inactive);
        assert!(!body.checks.jwt_secret);
        assert!(!body.checks.environment_vars);
        assert!(body.metadata.warnings.iter().any(|w| w.contains("JWT_SECRET")));
    }

    #[sqlx::test]
    async fn test_missing_locations_degrades(pool: PgPool) {
        let mut state = create_test_state(pool, create_test_config());
        state.locations = None;
        let server = TestServer::new(crate::build_router(state)).unwrap();

        let body: HealthResponse = server.get("/api/health").await.json();
        assert_eq!(body.status, HealthStatus::Degraded);
        assert!(!body.checks.psgc_data);
        assert_eq!(body.metadata.warnings, ["PSGC data import failed"]);
    }

    #[sqlx::test]
    async fn test_closed_pool_is_unhealthy(pool: PgPool) {
        let state = create_test_state(pool.clone(), create_test_config());
        pool.close().await;
        let server = TestServer::new(crate::build_router(state)).unwrap();

        let response = server.get("/api/health").await;
        response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, HealthStatus::Unhealthy);
        assert_eq!(body.metadata.error.as_deref(), Some("Database connection failed"));
    }

    #[sqlx::test]
    async fn test_healthz(pool: PgPool) {
        let server = TestServer::new(crate::build_router(create_test_state(pool, create_test_config()))).unwrap();
        let response = server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }
}
