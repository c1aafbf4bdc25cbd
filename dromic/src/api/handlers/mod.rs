//! HTTP request handlers for all API endpoints.
//!
//! Handlers validate the request, run repository operations on a pooled connection,
//! append to the activity log where the operation calls for it, and serialize the response.
//!
//! # Handler Modules
//!
//! - [`auth`]: Login with lockout, registration, logout, session lookup and password reset
//! - [`users`]: Profile and account edits, password change, activity feed, notifications
//! - [`health`]: `/api/health` report and `/healthz` liveness check
//! - [`locations`]: PSGC region, province, city and barangay lookups
//! - [`dashboard`]: Aggregate statistics and read-only disaster record listings
//! - [`settings`]: Public system settings
//!
//! # Authentication
//!
//! Handlers that need a session take [`CurrentUser`](crate::api::models::users::CurrentUser)
//! as an extractor; it reads the session cookie and rejects the request with 401 when it
//! is missing or invalid.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to the matching HTTP status
//! and a JSON `{"error": ...}` body.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod locations;
pub mod settings;
pub mod users;
