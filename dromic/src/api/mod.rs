//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`extractors`]**: Request body extraction with validation-style rejections
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/api/auth/*`): Login, registration, logout, password reset
//! - **User** (`/api/user/*`): Self-service profile, password, activity and notifications
//! - **Locations** (`/api/locations/*`): PSGC reference lookups
//! - **Dashboard** (`/api/dashboard/stats`, `/api/incidents`, `/api/evacuation-centers`,
//!   `/api/assistance-records`): Read-only disaster data
//! - **Settings** (`/api/settings/public`): Public configuration
//! - **Health** (`/api/health`, `/healthz`)
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa`. The rendered reference is served at
//! `/api/docs` and the raw document at `/api/openapi.json`.

pub mod extractors;
pub mod handlers;
pub mod models;
