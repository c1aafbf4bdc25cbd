//! OpenAPI documentation for the HTTP API.
//!
//! [`ApiDoc`] collects every documented handler. Schemas referenced by the handlers are
//! registered automatically; the session cookie is declared as the `session_cookie`
//! security scheme.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api::{handlers, models};

/// Declares the `auth-token` session cookie issued by login and registration.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_cookie".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "auth-token",
                    "Session token set as an HttpOnly cookie by `POST /api/auth/login` and `POST /api/auth/register`.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DROMIC-IS API",
        description = "Disaster Response Operations Monitoring and Information Center: authentication, \
                       self-service account management, PSGC lookups and read-only disaster data."
    ),
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::register,
        handlers::auth::me,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::users::update_profile,
        handlers::users::change_password,
        handlers::users::list_activity,
        handlers::users::list_notifications,
        handlers::users::mark_notification_read,
        handlers::locations::list_regions,
        handlers::locations::list_provinces,
        handlers::locations::list_cities,
        handlers::locations::list_barangays,
        handlers::dashboard::get_stats,
        handlers::dashboard::list_incidents,
        handlers::dashboard::list_evacuation_centers,
        handlers::dashboard::list_assistance_records,
        handlers::settings::list_public_settings,
        handlers::health::health,
        handlers::health::healthz,
    ),
    components(schemas(
        models::auth::LoginRequest,
        models::auth::RegisterRequest,
        models::auth::AuthResponse,
        models::auth::ForgotPasswordRequest,
        models::auth::ResetPasswordRequest,
        models::users::MessageResponse,
        models::users::MeResponse,
        models::users::UpdateProfileRequest,
        models::users::ChangePasswordRequest,
        models::activity::ActivityListResponse,
        models::activity::NotificationListResponse,
        models::records::DashboardStatsResponse,
        models::health::HealthResponse,
    )),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "authentication", description = "Login, registration and password reset"),
        (name = "user", description = "Self-service for the signed-in user"),
        (name = "locations", description = "PSGC region, province, city and barangay lookups"),
        (name = "dashboard", description = "Read-only disaster records and statistics"),
        (name = "settings", description = "Public system settings"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_cookie_scheme() {
        let doc = ApiDoc::openapi();
        for path in ["/api/auth/login", "/api/user/profile", "/api/locations/regions", "/api/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("session_cookie"));
    }
}
