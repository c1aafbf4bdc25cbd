//! Request body extraction.
//!
//! axum's own [`Json`] answers a malformed or mistyped body with a plain-text 422. Handlers
//! take [`JsonBody`] instead, which reports the same problems as a `400 Validation failed`
//! with one [`FieldError`] naming the offending field where serde tells us which one it is.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{Error, FieldError};

/// Field reported when a rejection cannot be pinned to a single key.
const WHOLE_BODY: &str = "body";

/// JSON request body whose rejections render as validation errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(status = %rejection.status(), "Rejected request body: {}", rejection.body_text());
                Err(Error::Validation {
                    errors: vec![field_error(&rejection)],
                })
            }
        }
    }
}

fn field_error(rejection: &JsonRejection) -> FieldError {
    let text = rejection.body_text();
    match rejection {
        JsonRejection::JsonDataError(_) => {
            // serde reports "missing field `x`", or "x.y: <reason>" via the deserializer path
            let detail = text.split_once("target type: ").map_or(text.as_str(), |(_, rest)| rest);
            if let Some(field) = backticked_after(detail, "missing field `") {
                return FieldError::new(field, format!("{field} is required"));
            }
            match detail.split_once(": ") {
                Some((path, reason)) if !path.is_empty() && !path.contains(' ') => FieldError::new(path, reason),
                _ => FieldError::new(WHOLE_BODY, detail),
            }
        }
        JsonRejection::MissingJsonContentType(_) => FieldError::new(WHOLE_BODY, "Request body must be JSON"),
        _ => FieldError::new(WHOLE_BODY, text),
    }
}

fn backticked_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let (_, rest) = text.split_once(marker)?;
    rest.split_once('`').map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header::CONTENT_TYPE};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Credentials {
        email: String,
        confirm_password: String,
        remember: Option<bool>,
    }

    async fn extract(content_type: Option<&str>, body: &str) -> Result<JsonBody<Credentials>, Error> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        JsonBody::<Credentials>::from_request(req, &()).await
    }

    fn single_error(result: Result<JsonBody<Credentials>, Error>) -> FieldError {
        match result {
            Err(Error::Validation { mut errors }) => {
                assert_eq!(errors.len(), 1, "{errors:?}");
                errors.remove(0)
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_valid_body_extracts() {
        let JsonBody(credentials) = extract(
            Some("application/json"),
            r#"{"email":"a@b.ph","confirmPassword":"x","remember":true}"#,
        )
        .await
        .unwrap();
        assert_eq!(credentials.email, "a@b.ph");
        assert_eq!(credentials.remember, Some(true));
    }

    #[tokio::test]
    async fn test_missing_field_names_the_field() {
        let error = single_error(extract(Some("application/json"), r#"{"email":"a@b.ph"}"#).await);
        assert_eq!(error.field, "confirmPassword");
        assert_eq!(error.message, "confirmPassword is required");
    }

    #[tokio::test]
    async fn test_wrong_type_names_the_field() {
        let error = single_error(
            extract(
                Some("application/json"),
                r#"{"email":"a@b.ph","confirmPassword":"x","remember":"yes"}"#,
            )
            .await,
        );
        assert_eq!(error.field, "remember");
        assert!(error.message.contains("invalid type"), "{}", error.message);
    }

    #[tokio::test]
    async fn test_malformed_json_reports_body() {
        let error = single_error(extract(Some("application/json"), r#"{"email":"#).await);
        assert_eq!(error.field, WHOLE_BODY);
    }

    #[tokio::test]
    async fn test_missing_content_type_reports_body() {
        let error = single_error(extract(None, r#"{"email":"a@b.ph","confirmPassword":"x"}"#).await);
        assert_eq!(error.field, WHOLE_BODY);
        assert_eq!(error.message, "Request body must be JSON");
    }

    #[tokio::test]
    async fn test_rejection_renders_as_bad_request() {
        use axum::response::IntoResponse;

        let error = extract(Some("application/json"), "[]").await.unwrap_err();
        assert_eq!(error.into_response().status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
