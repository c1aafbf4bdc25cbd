//! API request/response models for authentication.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::users::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address or username
    #[serde(alias = "identifier", alias = "username")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(alias = "middleInitial")]
    pub middle_name: Option<String>,
    pub name_extension: Option<String>,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub phone_number: String,
    pub address: String,
    /// One of the nine DSWD positions
    pub position: String,
    pub job_title: String,
    pub division: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    pub terms_accepted: bool,
    pub privacy_policy_accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

/// A JSON body plus a `Set-Cookie` header.
pub struct WithCookie<T> {
    pub status: StatusCode,
    pub body: T,
    pub cookie: String,
}

impl<T: Serialize> IntoResponse for WithCookie<T> {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        match self.cookie.parse() {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Invalid session cookie header: {e}"),
        }
        response
    }
}

pub type LoginResponse = WithCookie<AuthResponse>;
pub type RegisterResponse = WithCookie<AuthResponse>;
pub type LogoutResponse = WithCookie<super::users::MessageResponse>;
