//! Database repository for evacuation centers (read side).

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{
    errors::Result,
    models::evacuation_centers::{CenterStatus, EvacuationCenterDBResponse, EvacuationCenterFilter, EvacuationCenterSummary},
};

const CENTER_COLUMNS: &str = "id, center_name, center_type, capacity, current_occupancy, region, province, city, \
     barangay, complete_address, coordinates, facilities, contact_person, contact_number, managed_by, status, \
     opened_date, closed_date, created_at, updated_at";

pub struct EvacuationCenters<'c> {
    db: &'c mut PgConnection,
}

impl<'c> EvacuationCenters<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &EvacuationCenterFilter) -> Result<Vec<EvacuationCenterDBResponse>> {
        let sql = format!(
            "SELECT {CENTER_COLUMNS} FROM evacuation_centers WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY center_name LIMIT $2 OFFSET $3"
        );
        let centers = sqlx::query_as::<_, EvacuationCenterDBResponse>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(centers)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &EvacuationCenterFilter) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM evacuation_centers WHERE ($1::text IS NULL OR status = $1)")
                .bind(filter.status.map(|s| s.as_str()))
                .fetch_one(&mut *self.db)
                .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn summary(&mut self) -> Result<EvacuationCenterSummary> {
        let summary = sqlx::query_as::<_, EvacuationCenterSummary>(
            "SELECT COUNT(*) AS total, \
                 COUNT(*) FILTER (WHERE status = $1) AS available, \
                 COUNT(*) FILTER (WHERE status = $2) AS full, \
                 COALESCE(SUM(capacity), 0)::bigint AS total_capacity, \
                 COALESCE(SUM(current_occupancy), 0)::bigint AS current_occupancy \
             FROM evacuation_centers",
        )
        .bind(CenterStatus::Available.as_str())
        .bind(CenterStatus::Full.as_str())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(summary)
    }
}
