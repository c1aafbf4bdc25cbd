//! Database repository for relief assistance records (read side).

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{
    errors::Result,
    models::assistance_records::{AssistanceRecordDBResponse, AssistanceRecordFilter, AssistanceStatusTotal},
};

const RECORD_COLUMNS: &str = "id, record_code, incident_id, family_head_name, family_members, assistance_type, \
     assistance_details, amount, quantity, distribution_date, region, province, city, barangay, \
     beneficiary_address, distributed_by, verified_by, status, remarks, created_at, updated_at";

const FILTER_CLAUSE: &str = "($1::text IS NULL OR status = $1) AND ($2::uuid IS NULL OR incident_id = $2)";

pub struct AssistanceRecords<'c> {
    db: &'c mut PgConnection,
}

impl<'c> AssistanceRecords<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &AssistanceRecordFilter) -> Result<Vec<AssistanceRecordDBResponse>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM assistance_records WHERE {FILTER_CLAUSE} \
             ORDER BY created_at DESC, record_code LIMIT $3 OFFSET $4"
        );
        let records = sqlx::query_as::<_, AssistanceRecordDBResponse>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.incident_id)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(records)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &AssistanceRecordFilter) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM assistance_records WHERE {FILTER_CLAUSE}");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.incident_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    /// Record counts, families served and amount distributed, per status.
    #[instrument(skip(self), err)]
    pub async fn totals_by_status(&mut self) -> Result<Vec<AssistanceStatusTotal>> {
        let totals = sqlx::query_as::<_, AssistanceStatusTotal>(
            "SELECT status, COUNT(*) AS records, \
                 COALESCE(SUM(family_members), 0)::bigint AS families_served, \
                 COALESCE(SUM(amount), 0) AS total_amount \
             FROM assistance_records GROUP BY status ORDER BY status",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(totals)
    }
}
