use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use tracing::{debug, instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    errors::{Error, Result},
};

/// Read the raw session token from the `Cookie` header, if present.
pub(crate) fn session_cookie<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

    cookie_header
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie present but the token is invalid or expired
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &Config) -> Option<Result<CurrentUser>> {
    let token = session_cookie(parts, &config.auth.session.cookie_name)?;
    Some(session::verify_session_token(token, config))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found JWT session authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("JWT session authentication failed: {:?}", e);
                match e {
                    // A missing secret is a server fault, not a bad credential
                    Error::Internal { .. } => Err(e),
                    _ => Err(Error::Unauthenticated {
                        message: Some("Invalid or expired token".to_string()),
                    }),
                }
            }
            None => {
                trace!("No authentication credentials found in request");
                Err(Error::Unauthenticated {
                    message: Some("No authentication token found".to_string()),
                })
            }
        }
    }
}

/// Optional session, for endpoints such as logout that behave differently when signed in.
/// Any invalid or missing token yields `None`.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>> {
        Ok(try_jwt_session_auth(parts, &state.config).and_then(|result| result.ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_config, create_test_state};
    use sqlx::PgPool;
    use uuid::Uuid;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(axum::http::header::COOKIE, cookie)
            .body(())
            .unwrap();

        let (parts, _body) = request.into_parts();
        parts
    }

    fn test_user() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "officer@dromic.dswd.gov.ph".to_string(),
            user_level_id: None,
            position: Some("Field Officer".to_string()),
            session_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_session_cookie_parsing() {
        let parts = parts_with_cookie("theme=dark; auth-token=abc.def.ghi; other=1");
        assert_eq!(session_cookie(&parts, "auth-token"), Some("abc.def.ghi"));
        assert_eq!(session_cookie(&parts, "missing"), None);

        let parts = parts_with_cookie("auth-token=");
        assert_eq!(session_cookie(&parts, "auth-token"), None);
    }

    #[sqlx::test]
    async fn test_valid_cookie_extracts_user(pool: PgPool) {
        let config = create_test_config();
        let user = test_user();
        let token = session::create_session_token(&user, &config).unwrap();
        let state = create_test_state(pool, config);

        let mut parts = parts_with_cookie(&format!("auth-token={token}"));
        let extracted = <CurrentUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(extracted.id, user.id);
        assert_eq!(extracted.session_id, user.session_id);
    }

    #[sqlx::test]
    async fn test_missing_or_bad_cookie_rejected(pool: PgPool) {
        let state = create_test_state(pool, create_test_config());

        let mut parts = parts_with_cookie("theme=dark");
        let result = <CurrentUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));

        let mut parts = parts_with_cookie("auth-token=not-a-jwt");
        let result = <CurrentUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));

        let optional = <CurrentUser as OptionalFromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(optional.is_none());
    }
}
