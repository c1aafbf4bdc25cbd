use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::records::PublicSettingResponse,
    db::handlers::SystemSettings,
    errors::Error,
};

/// Settings flagged public, readable without a session.
#[utoipa::path(
    get,
    path = "/api/settings/public",
    tag = "settings",
    responses((status = 200, description = "Public settings", body = [PublicSettingResponse]))
)]
#[tracing::instrument(skip_all)]
pub async fn list_public_settings(State(state): State<AppState>) -> Result<Json<Vec<PublicSettingResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let settings = SystemSettings::new(&mut conn).list_public().await?;

    Ok(Json(settings.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        seed,
        test_utils::{create_test_config, create_test_state},
    };
    use axum_test::TestServer;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_only_public_settings_exposed(pool: PgPool) {
        let config = create_test_config();
        seed::run(&pool, &config, false).await.unwrap();
        let server = TestServer::new(crate::build_router(create_test_state(pool, config))).unwrap();

        let response = server.get("/api/settings/public").await;
        response.assert_status_ok();
        let settings: Vec<PublicSettingResponse> = response.json();

        let keys: Vec<_> = settings.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys.len(), 5);
        assert!(keys.contains(&"app_name"));
        assert!(keys.contains(&"incident_types"));
        assert!(!keys.contains(&"security_settings"));
        assert!(!keys.contains(&"maintenance_mode"));
    }
}
