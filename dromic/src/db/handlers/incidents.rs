//! Database repository for disaster incidents (read side).

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        models::incidents::{IncidentDBResponse, IncidentFilter, IncidentStatus, IncidentSummary},
    },
    types::{IncidentId, abbrev_uuid},
};

const INCIDENT_COLUMNS: &str = "id, incident_code, incident_type, incident_name, description, severity_level, status, \
     region, province, city, barangay, coordinates, reported_by, assigned_to, date_occurred, date_reported, \
     date_resolved, affected_families, affected_persons, casualties, created_at, updated_at";

pub struct Incidents<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Incidents<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(incident_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: IncidentId) -> Result<Option<IncidentDBResponse>> {
        let sql = format!("SELECT {INCIDENT_COLUMNS} FROM incidents WHERE id = $1");
        let incident = sqlx::query_as::<_, IncidentDBResponse>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(incident)
    }

    /// Most recently reported first.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &IncidentFilter) -> Result<Vec<IncidentDBResponse>> {
        let sql = format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY date_reported DESC, incident_code LIMIT $2 OFFSET $3"
        );
        let incidents = sqlx::query_as::<_, IncidentDBResponse>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(incidents)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &IncidentFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidents WHERE ($1::text IS NULL OR status = $1)")
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    /// Totals over every incident that is not closed.
    #[instrument(skip(self), err)]
    pub async fn summary(&mut self) -> Result<IncidentSummary> {
        let summary = sqlx::query_as::<_, IncidentSummary>(
            "SELECT COUNT(*) AS total, \
                 COUNT(*) FILTER (WHERE status = $1) AS active, \
                 COUNT(*) FILTER (WHERE status = $2) AS monitoring, \
                 COALESCE(SUM(affected_families), 0)::bigint AS affected_families, \
                 COALESCE(SUM(affected_persons), 0)::bigint AS affected_persons \
             FROM incidents WHERE status <> $3",
        )
        .bind(IncidentStatus::Active.as_str())
        .bind(IncidentStatus::Monitoring.as_str())
        .bind(IncidentStatus::Closed.as_str())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(summary)
    }
}
