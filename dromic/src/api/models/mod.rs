//! API request and response data models.
//!
//! API models are distinct from the database models in [`crate::db::models`], so the
//! JSON contract and the storage representation can change independently. Every model is
//! annotated with `utoipa` for the generated API documentation.
//!
//! - [`auth`]: Login, registration and password reset payloads
//! - [`users`]: The session user, profile views and self-service requests
//! - [`activity`]: Activity feed and notifications
//! - [`records`]: Disaster records, dashboard statistics and public settings
//! - [`health`]: Health report
//! - [`pagination`]: Shared `skip`/`limit` and page-number pagination

pub mod activity;
pub mod auth;
pub mod health;
pub mod pagination;
pub mod records;
pub mod users;
