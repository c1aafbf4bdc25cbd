//! Read-only dashboard: aggregate statistics and the incident, evacuation center and
//! assistance record listings.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        records::{
            AssistanceRecordResponse, AssistanceStats, DashboardStatsResponse, EvacuationCenterResponse, IncidentResponse,
            ListAssistanceRecordsQuery, ListEvacuationCentersQuery, ListIncidentsQuery,
        },
        users::CurrentUser,
    },
    db::{
        handlers::{AssistanceRecords, EvacuationCenters, Incidents},
        models::{assistance_records::AssistanceRecordFilter, evacuation_centers::EvacuationCenterFilter, incidents::IncidentFilter},
    },
    errors::Error,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Aggregate statistics", body = DashboardStatsResponse),
        (status = 401, description = "No valid session"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_stats(State(state): State<AppState>, _current_user: CurrentUser) -> Result<Json<DashboardStatsResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let incidents = Incidents::new(&mut conn).summary().await?;
    let centers = EvacuationCenters::new(&mut conn).summary().await?;
    let assistance = AssistanceRecords::new(&mut conn).totals_by_status().await?;

    Ok(Json(DashboardStatsResponse {
        incidents: incidents.into(),
        evacuation_centers: centers.into(),
        assistance: AssistanceStats::from_totals(assistance),
        generated_at: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/incidents",
    params(ListIncidentsQuery),
    tag = "dashboard",
    responses(
        (status = 200, description = "Incidents, most recently reported first", body = PaginatedResponse<IncidentResponse>),
        (status = 401, description = "No valid session"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_incidents(
    State(state): State<AppState>,
    Query(query): Query<ListIncidentsQuery>,
    _current_user: CurrentUser,
) -> Result<Json<PaginatedResponse<IncidentResponse>>, Error> {
    let filter = IncidentFilter {
        status: query.status,
        skip: query.pagination.skip(),
        limit: query.pagination.limit(),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Incidents::new(&mut conn);
    let incidents = repo.list(&filter).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        incidents.into_iter().map(Into::into).collect(),
        total,
        filter.skip,
        filter.limit,
    )))
}

#[utoipa::path(
    get,
    path = "/api/evacuation-centers",
    params(ListEvacuationCentersQuery),
    tag = "dashboard",
    responses(
        (status = 200, description = "Evacuation centers", body = PaginatedResponse<EvacuationCenterResponse>),
        (status = 401, description = "No valid session"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_evacuation_centers(
    State(state): State<AppState>,
    Query(query): Query<ListEvacuationCentersQuery>,
    _current_user: CurrentUser,
) -> Result<Json<PaginatedResponse<EvacuationCenterResponse>>, Error> {
    let filter = EvacuationCenterFilter {
        status: query.status,
        skip: query.pagination.skip(),
        limit: query.pagination.limit(),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = EvacuationCenters::new(&mut conn);
    let centers = repo.list(&filter).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        centers.into_iter().map(Into::into).collect(),
        total,
        filter.skip,
        filter.limit,
    )))
}

#[utoipa::path(
    get,
    path = "/api/assistance-records",
    params(ListAssistanceRecordsQuery),
    tag = "dashboard",
    responses(
        (status = 200, description = "Assistance records", body = PaginatedResponse<AssistanceRecordResponse>),
        (status = 401, description = "No valid session"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_assistance_records(
    State(state): State<AppState>,
    Query(query): Query<ListAssistanceRecordsQuery>,
    _current_user: CurrentUser,
) -> Result<Json<PaginatedResponse<AssistanceRecordResponse>>, Error> {
    let filter = AssistanceRecordFilter {
        status: query.status,
        incident_id: None,
        skip: query.pagination.skip(),
        limit: query.pagination.limit(),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = AssistanceRecords::new(&mut conn);
    let records = repo.list(&filter).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        records.into_iter().map(Into::into).collect(),
        total,
        filter.skip,
        filter.limit,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::models::{assistance_records::AssistanceStatus, incidents::IncidentStatus},
        seed,
        test_utils::{create_test_account, create_test_config, create_test_state, session_cookie_for},
    };
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use serde_json::Value;
    use sqlx::PgPool;

    async fn seeded_server(pool: &PgPool) -> (TestServer, String) {
        let config = create_test_config();
        seed::run(pool, &config, false).await.unwrap();
        let account = create_test_account(pool, "viewer", "viewer@dswd.gov.ph").await;
        let cookie = session_cookie_for(&account, &config);
        let server = TestServer::new(crate::build_router(create_test_state(pool.clone(), config))).unwrap();
        (server, cookie)
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_stats_over_seeded_data(pool: PgPool) {
        let (server, cookie) = seeded_server(&pool).await;

        let response = server.get("/api/dashboard/stats").add_header("cookie", cookie).await;
        response.assert_status_ok();
        let stats: DashboardStatsResponse = response.json();

        assert_eq!(stats.incidents.total, 3);
        assert_eq!(stats.incidents.active, 1);
        assert_eq!(stats.incidents.monitoring, 1);
        assert_eq!(stats.incidents.affected_families, 435);
        assert_eq!(stats.incidents.affected_persons, 1740);

        assert_eq!(stats.evacuation_centers.total, 3);
        assert_eq!(stats.evacuation_centers.total_capacity, 1600);
        assert_eq!(stats.evacuation_centers.current_occupancy, 345);
        assert_eq!(stats.evacuation_centers.occupancy_rate, 21.6);

        assert_eq!(stats.assistance.total_records, 3);
        assert_eq!(stats.assistance.families_served, 15);
        assert_eq!(stats.assistance.total_amount, Decimal::new(5000, 0));
    }

    #[sqlx::test]
    async fn test_list_incidents_with_status_filter(pool: PgPool) {
        let (server, cookie) = seeded_server(&pool).await;

        let response = server
            .get("/api/incidents?status=Active")
            .add_header("cookie", cookie.clone())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["data"][0]["incident_code"], "TY-2024-001");
        assert_eq!(body["data"][0]["status"], IncidentStatus::Active.as_str());

        let body: Value = server
            .get("/api/incidents?skip=1&limit=1")
            .add_header("cookie", cookie)
            .await
            .json();
        assert_eq!(body["total_count"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["skip"], 1);
    }

    #[sqlx::test]
    async fn test_list_centers_and_records(pool: PgPool) {
        let (server, cookie) = seeded_server(&pool).await;

        let centers: Value = server
            .get("/api/evacuation-centers")
            .add_header("cookie", cookie.clone())
            .await
            .json();
        assert_eq!(centers["total_count"], 3);
        assert_eq!(centers["limit"], 10);

        let records: Value = server
            .get("/api/assistance-records?status=Approved")
            .add_header("cookie", cookie.clone())
            .await
            .json();
        assert_eq!(records["total_count"], 1);
        assert_eq!(records["data"][0]["family_head_name"], "Maria Garcia");
        assert_eq!(records["data"][0]["status"], AssistanceStatus::Approved.as_str());

        server
            .get("/api/assistance-records?status=Lost")
            .add_header("cookie", cookie)
            .await
            .assert_status_bad_request();
    }

    #[sqlx::test]
    async fn test_lists_require_session(pool: PgPool) {
        let server = TestServer::new(crate::build_router(create_test_state(pool, create_test_config()))).unwrap();

        for path in ["/api/dashboard/stats", "/api/incidents", "/api/evacuation-centers", "/api/assistance-records"] {
            server.get(path).await.assert_status_unauthorized();
        }
    }
}
