//! # dromic: DROMIC-IS backend
//!
//! `dromic` is the HTTP backend of the Disaster Response Operations Monitoring and Information
//! Center information system. It authenticates DSWD staff, lets them manage their own profile,
//! password and notifications, serves PSGC location lookups for the registration and reporting
//! forms, and exposes read-only disaster data (incidents, evacuation centers and assistance
//! records) to the dashboard.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL for all persistence. Handlers are stateless; the only shared state is the
//! connection pool, the configuration and the immutable PSGC [`locations::LocationDirectory`].
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) exposes JSON endpoints under `/api/*`. Request and response
//! models are kept apart from the database models so the wire contract and the schema can move
//! independently.
//!
//! The **authentication layer** ([`auth`]) issues a signed JWT in an HTTP-only cookie on login
//! and registration, verifies it through the [`api::models::users::CurrentUser`] extractor,
//! hashes passwords with bcrypt on the blocking pool and enforces the failed-login lockout.
//!
//! The **audit trail** ([`audit`]) records authentication and account events in the append-only
//! `activity_log` table. Audit writes never fail the request that triggered them.
//!
//! The **database layer** ([`db`]) uses the repository pattern over a borrowed `PgConnection`,
//! so the same repository works on a pooled connection or inside a transaction.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use dromic::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = dromic::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     dromic::telemetry::init_telemetry(config.log_level.as_deref(), config.enable_otel_export)?;
//!
//!     let app = Application::new(config, args.reseed).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations run on startup. To run them by hand:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! dromic::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod errors;
pub mod locations;
mod openapi;
pub mod seed;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

use std::{sync::Arc, time::Instant};

use axum::{
    Json, Router,
    http::{self, HeaderValue, Method},
    routing::{get, patch, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, error, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;

use crate::{config::CorsOrigin, locations::LocationDirectory, openapi::ApiDoc, seed::SeedOutcome};

/// Application state shared across all request handlers.
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration
/// - `locations`: PSGC reference data; `None` when it failed to load, which the health
///   endpoint reports as degraded
/// - `started_at`: Process start, for the uptime in the health report
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .maybe_locations(LocationDirectory::load_embedded().ok().map(Arc::new))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub locations: Option<Arc<LocationDirectory>>,
    #[builder(default = Instant::now())]
    pub started_at: Instant,
}

/// Get the dromic database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect, migrate and (when enabled) seed.
#[instrument(skip_all, fields(reseed = reseed))]
async fn setup_database(config: &Config, reseed: bool) -> anyhow::Result<PgPool> {
    let Some(url) = config.database.url.as_deref() else {
        anyhow::bail!("No database URL configured. Set DATABASE_URL or database.url in the config file.");
    };

    let settings = &config.database.pool;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .connect(url)
        .await?;

    migrator().run(&pool).await?;
    info!("Database migrations applied");

    if config.seed.enabled || reseed {
        match seed::run(&pool, config, reseed).await? {
            SeedOutcome::Skipped => debug!("Seed data already present"),
            SeedOutcome::Seeded(summary) => info!(?summary, "Seed data written"),
        }
    }

    Ok(pool)
}

/// Load the embedded PSGC data. A failure is logged and leaves the directory empty.
fn load_locations() -> Option<Arc<LocationDirectory>> {
    match LocationDirectory::load_embedded() {
        Ok(directory) => {
            let (regions, provinces, cities, barangays) = directory.counts();
            info!(regions, provinces, cities, barangays, "Loaded PSGC location data");
            Some(Arc::new(directory))
        }
        Err(e) => {
            error!("Failed to load PSGC location data: {}", e);
            None
        }
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.cors;

    let allow_origin = if cors_config.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION, http::header::ACCEPT])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// - Authentication routes (`/api/auth/*`)
/// - Self-service routes for the signed-in user (`/api/user/*`)
/// - PSGC lookups, dashboard data, public settings and health
/// - API reference at `/api/docs`, raw document at `/api/openapi.json`
/// - Optional Prometheus metrics at `/internal/metrics`
/// - CORS and tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> Router {
    use api::handlers::{auth, dashboard, health, locations, settings, users};

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
        .route("/me", get(auth::me))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password));

    let user_routes = Router::new()
        .route("/profile", patch(users::update_profile))
        .route("/change-password", post(users::change_password))
        .route("/activity", get(users::list_activity))
        .route("/notifications", get(users::list_notifications))
        .route("/notifications/{id}/read", post(users::mark_notification_read));

    let location_routes = Router::new()
        .route("/regions", get(locations::list_regions))
        .route("/regions/{id}/provinces", get(locations::list_provinces))
        .route("/provinces/{id}/cities", get(locations::list_cities))
        .route("/cities/{id}/barangays", get(locations::list_barangays));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/locations", location_routes)
        .route("/dashboard/stats", get(dashboard::get_stats))
        .route("/incidents", get(dashboard::list_incidents))
        .route("/evacuation-centers", get(dashboard::list_evacuation_centers))
        .route("/assistance-records", get(dashboard::list_assistance_records))
        .route("/settings/public", get(settings::list_public_settings))
        .route("/health", get(health::health))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    let enable_metrics = state.config.enable_metrics;
    let cors_layer = create_cors_layer(&state.config);

    let router = Router::new()
        .route("/healthz", get(health::healthz))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()));

    let mut router = match cors_layer {
        Ok(cors) => router.layer(cors),
        Err(e) => {
            warn!("Invalid CORS configuration, serving without CORS headers: {}", e);
            router
        }
    };

    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Main application struct that owns the router, the pool and the configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects, runs migrations, seeds and builds the router
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
/// 3. **Shutdown**: When the shutdown future resolves, in-flight requests drain, the pool is
///    closed and pending spans are flushed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance. `reseed` forces the seed step even when data exists.
    pub async fn new(config: Config, reseed: bool) -> anyhow::Result<Self> {
        debug!("Starting DROMIC-IS with configuration: {:#?}", config);

        if !config.has_strong_secret() {
            warn!("No signing secret of sufficient length is configured; sessions cannot be issued");
        }

        let pool = setup_database(&config, reseed).await?;

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .maybe_locations(load_locations())
            .build();

        let router = build_router(app_state);

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "DROMIC-IS listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
