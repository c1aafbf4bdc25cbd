//! Database repository for user levels.
//!
//! User levels are reference data written by the seeder, so this repository exposes lookups
//! and an upsert rather than the full [`Repository`](super::repository::Repository) surface.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        models::user_levels::{UserLevelDBResponse, UserLevelStatus, UserLevelUpsertDBRequest},
    },
    types::{UserLevelId, abbrev_uuid},
};

const USER_LEVEL_COLUMNS: &str = "id, position, abbreviation, rank, permissions, status, created_at, updated_at";

pub struct UserLevels<'c> {
    db: &'c mut PgConnection,
}

impl<'c> UserLevels<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_level_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: UserLevelId) -> Result<Option<UserLevelDBResponse>> {
        let sql = format!("SELECT {USER_LEVEL_COLUMNS} FROM user_level WHERE id = $1");
        let level = sqlx::query_as::<_, UserLevelDBResponse>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(level)
    }

    /// Resolve the active level for a position name chosen at registration.
    #[instrument(skip(self), err)]
    pub async fn get_active_by_position(&mut self, position: &str) -> Result<Option<UserLevelDBResponse>> {
        let sql = format!("SELECT {USER_LEVEL_COLUMNS} FROM user_level WHERE position = $1 AND status = $2");
        let level = sqlx::query_as::<_, UserLevelDBResponse>(&sql)
            .bind(position)
            .bind(UserLevelStatus::Active.as_str())
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(level)
    }

    /// All levels, most senior first.
    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<UserLevelDBResponse>> {
        let sql = format!("SELECT {USER_LEVEL_COLUMNS} FROM user_level ORDER BY rank DESC, position");
        let levels = sqlx::query_as::<_, UserLevelDBResponse>(&sql)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(levels)
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_level")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self, request), fields(position = %request.position), err)]
    pub async fn upsert(&mut self, request: &UserLevelUpsertDBRequest) -> Result<UserLevelDBResponse> {
        let sql = format!(
            "INSERT INTO user_level (position, abbreviation, rank, permissions) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (position) DO UPDATE SET \
                 abbreviation = EXCLUDED.abbreviation, rank = EXCLUDED.rank, permissions = EXCLUDED.permissions \
             RETURNING {USER_LEVEL_COLUMNS}"
        );
        let level = sqlx::query_as::<_, UserLevelDBResponse>(&sql)
            .bind(&request.position)
            .bind(&request.abbreviation)
            .bind(request.rank)
            .bind(&request.permissions)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_upsert_is_keyed_by_position(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = UserLevels::new(&mut conn);

        let first = repo
            .upsert(&UserLevelUpsertDBRequest {
                position: "Field Officer".to_string(),
                abbreviation: "FO".to_string(),
                rank: 2,
                permissions: json!({"incidents": ["read"]}),
            })
            .await
            .unwrap();
        let second = repo
            .upsert(&UserLevelUpsertDBRequest {
                position: "Field Officer".to_string(),
                abbreviation: "FO".to_string(),
                rank: 3,
                permissions: json!({"incidents": ["read", "create"]}),
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.rank, 3);
        assert_eq!(repo.count().await.unwrap(), 1);

        let found = repo.get_active_by_position("Field Officer").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(repo.get_active_by_position("Janitor").await.unwrap().is_none());
    }
}
