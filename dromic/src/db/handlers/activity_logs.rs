//! Database repository for the append-only activity log.
//!
//! Entries can be appended and read but never changed. `delete` is refused here with
//! [`DbError::ProtectedEntity`], the update request type has no values, and a trigger rejects
//! both mutations in postgres as well.
//!
//! The trigger lets exactly one kind of `UPDATE` through: setting `account_id` to `NULL` with
//! every other column unchanged. That is the write `ON DELETE SET NULL` performs when an
//! account is removed, so the account's history outlives it, detached but intact. Code in this
//! crate never issues that update itself.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::activity_logs::{ActivityLogCreateDBRequest, ActivityLogDBResponse, ActivityLogFilter, ActivityLogUpdateDBRequest},
    },
    types::{LogId, Operation, abbrev_uuid},
};

const ACTIVITY_COLUMNS: &str = "log_id, account_id, activity_type, activity_category, target_table, target_id, \
     target_name, action_details, before_state, after_state, timestamp, host(ip_address) AS ip_address, \
     device_info, status, notes";

const FILTER_CLAUSE: &str = "($1::uuid IS NULL OR account_id = $1) \
     AND ($2::text IS NULL OR activity_type = $2) \
     AND ($3::text IS NULL OR activity_category = $3) \
     AND ($4::int IS NULL OR timestamp >= NOW() - make_interval(days => $4))";

pub struct ActivityLogs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> ActivityLogs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Number of entries matching the filter, ignoring `skip` and `limit`.
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &ActivityLogFilter) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM activity_log WHERE {FILTER_CLAUSE}");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(filter.account_id)
            .bind(&filter.activity_type)
            .bind(&filter.activity_category)
            .bind(filter.within_days)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for ActivityLogs<'c> {
    type CreateRequest = ActivityLogCreateDBRequest;
    type UpdateRequest = ActivityLogUpdateDBRequest;
    type Response = ActivityLogDBResponse;
    type Id = LogId;
    type Filter = ActivityLogFilter;

    #[instrument(skip(self, request), fields(activity_type = %request.activity_type), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            "INSERT INTO activity_log (account_id, activity_type, activity_category, target_table, target_id, \
             target_name, action_details, before_state, after_state, ip_address, device_info, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::inet, $11, $12, $13) RETURNING {ACTIVITY_COLUMNS}"
        );
        let entry = sqlx::query_as::<_, ActivityLogDBResponse>(&sql)
            .bind(request.account_id)
            .bind(&request.activity_type)
            .bind(&request.activity_category)
            .bind(&request.target_table)
            .bind(request.target_id)
            .bind(&request.target_name)
            .bind(&request.action_details)
            .bind(&request.before_state)
            .bind(&request.after_state)
            .bind(request.ip_address.map(|ip| ip.to_string()))
            .bind(&request.device_info)
            .bind(request.status.as_str())
            .bind(&request.notes)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(entry)
    }

    #[instrument(skip(self), fields(log_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activity_log WHERE log_id = $1");
        let entry = sqlx::query_as::<_, ActivityLogDBResponse>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(entry)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activity_log WHERE {FILTER_CLAUSE} \
             ORDER BY timestamp DESC, log_id LIMIT $5 OFFSET $6"
        );
        let entries = sqlx::query_as::<_, ActivityLogDBResponse>(&sql)
            .bind(filter.account_id)
            .bind(&filter.activity_type)
            .bind(&filter.activity_category)
            .bind(filter.within_days)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(entries)
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        Err(DbError::ProtectedEntity {
            operation: Operation::Delete,
            reason: "activity log entries are append-only".to_string(),
            entity_type: "activity_log".to_string(),
            entity_id: Some(id.to_string()),
        })
    }

    async fn update(&mut self, _id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Uninhabited request type: an update can never be expressed
        match *request {}
    }
}
