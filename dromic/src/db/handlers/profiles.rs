//! Database repository for personal profiles.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::profiles::{ProfileCreateDBRequest, ProfileDBResponse, ProfileFilter, ProfileUpdateDBRequest},
    },
    types::{ProfileId, abbrev_uuid},
};

const PROFILE_COLUMNS: &str = "id, first_name, middle_name, last_name, name_extension, date_of_birth, phone_number, \
     address, job_title, division, region, province, city, barangay, image_url, status, created_at, updated_at";

pub struct Profiles<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Profiles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Profiles<'c> {
    type CreateRequest = ProfileCreateDBRequest;
    type UpdateRequest = ProfileUpdateDBRequest;
    type Response = ProfileDBResponse;
    type Id = ProfileId;
    type Filter = ProfileFilter;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            "INSERT INTO profile (first_name, middle_name, last_name, name_extension, date_of_birth, phone_number, \
             address, job_title, division, region, province, city, barangay) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, ProfileDBResponse>(&sql)
            .bind(&request.first_name)
            .bind(&request.middle_name)
            .bind(&request.last_name)
            .bind(&request.name_extension)
            .bind(request.date_of_birth)
            .bind(&request.phone_number)
            .bind(&request.address)
            .bind(&request.job_title)
            .bind(&request.division)
            .bind(&request.region)
            .bind(&request.province)
            .bind(&request.city)
            .bind(&request.barangay)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(profile)
    }

    #[instrument(skip(self), fields(profile_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profile WHERE id = $1");
        let profile = sqlx::query_as::<_, ProfileDBResponse>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(profile)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profile WHERE ($1::text IS NULL OR region = $1) \
             ORDER BY last_name, first_name LIMIT $2 OFFSET $3"
        );
        let profiles = sqlx::query_as::<_, ProfileDBResponse>(&sql)
            .bind(&filter.region)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(profiles)
    }

    #[instrument(skip(self), fields(profile_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM profile WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(profile_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            "UPDATE profile SET first_name = $2, middle_name = $3, last_name = $4, name_extension = $5, \
             date_of_birth = $6, phone_number = $7, address = $8, job_title = $9, division = $10, \
             region = $11, province = $12, city = $13, barangay = $14 \
             WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, ProfileDBResponse>(&sql)
            .bind(id)
            .bind(&request.first_name)
            .bind(&request.middle_name)
            .bind(&request.last_name)
            .bind(&request.name_extension)
            .bind(request.date_of_birth)
            .bind(&request.phone_number)
            .bind(&request.address)
            .bind(&request.job_title)
            .bind(&request.division)
            .bind(&request.region)
            .bind(&request.province)
            .bind(&request.city)
            .bind(&request.barangay)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{errors::DbError, models::profiles::ProfileFields};
    use chrono::NaiveDate;
    use sqlx::PgPool;

    fn fields() -> ProfileFields {
        ProfileFields {
            first_name: "Maria".to_string(),
            middle_name: Some("Santos".to_string()),
            last_name: "Reyes".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17),
            region: Some("National Capital Region (NCR)".to_string()),
            city: Some("City of Manila".to_string()),
            ..Default::default()
        }
    }

    #[sqlx::test]
    async fn test_create_update_profile(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Profiles::new(&mut conn);

        let created = repo.create(&fields()).await.unwrap();
        assert_eq!(created.full_name(), "Maria Reyes");
        assert_eq!(created.fields(), fields());

        let mut changed = fields();
        changed.job_title = Some("Social Welfare Officer".to_string());
        changed.middle_name = None;
        let updated = repo.update(created.id, &changed).await.unwrap();
        assert_eq!(updated.fields(), changed);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[sqlx::test]
    async fn test_update_missing_profile(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Profiles::new(&mut conn);

        let result = repo.update(uuid::Uuid::new_v4(), &fields()).await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }
}
