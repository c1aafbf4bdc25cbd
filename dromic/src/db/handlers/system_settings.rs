//! Database repository for system settings.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{
    errors::Result,
    models::system_settings::{SystemSettingDBResponse, SystemSettingUpsertDBRequest},
};

const SETTING_COLUMNS: &str = "id, setting_key, setting_value, description, category, is_public, updated_at";

pub struct SystemSettings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> SystemSettings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Settings flagged `is_public`, safe to expose without a session.
    #[instrument(skip(self), err)]
    pub async fn list_public(&mut self) -> Result<Vec<SystemSettingDBResponse>> {
        let sql = format!("SELECT {SETTING_COLUMNS} FROM system_settings WHERE is_public ORDER BY category, setting_key");
        let settings = sqlx::query_as::<_, SystemSettingDBResponse>(&sql)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(settings)
    }

    #[instrument(skip(self), err)]
    pub async fn get(&mut self, key: &str) -> Result<Option<SystemSettingDBResponse>> {
        let sql = format!("SELECT {SETTING_COLUMNS} FROM system_settings WHERE setting_key = $1");
        let setting = sqlx::query_as::<_, SystemSettingDBResponse>(&sql)
            .bind(key)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(setting)
    }

    #[instrument(skip(self, request), fields(key = %request.setting_key), err)]
    pub async fn upsert(&mut self, request: &SystemSettingUpsertDBRequest) -> Result<SystemSettingDBResponse> {
        let sql = format!(
            "INSERT INTO system_settings (setting_key, setting_value, description, category, is_public) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (setting_key) DO UPDATE SET setting_value = EXCLUDED.setting_value, \
                 description = EXCLUDED.description, category = EXCLUDED.category, is_public = EXCLUDED.is_public \
             RETURNING {SETTING_COLUMNS}"
        );
        let setting = sqlx::query_as::<_, SystemSettingDBResponse>(&sql)
            .bind(&request.setting_key)
            .bind(&request.setting_value)
            .bind(&request.description)
            .bind(&request.category)
            .bind(request.is_public)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_only_public_settings_listed(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = SystemSettings::new(&mut conn);

        repo.upsert(&SystemSettingUpsertDBRequest {
            setting_key: "app_name".to_string(),
            setting_value: json!("DROMIC-IS"),
            description: None,
            category: "general".to_string(),
            is_public: true,
        })
        .await
        .unwrap();
        repo.upsert(&SystemSettingUpsertDBRequest {
            setting_key: "session_timeout".to_string(),
            setting_value: json!(604800),
            description: None,
            category: "security".to_string(),
            is_public: false,
        })
        .await
        .unwrap();

        let public = repo.list_public().await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].setting_key, "app_name");
        assert_eq!(public[0].setting_value, json!("DROMIC-IS"));
        assert!(repo.get("session_timeout").await.unwrap().is_some());
    }
}
