//! # crechectl: control plane for a multi-tenant creche platform
//!
//! `crechectl` is the backend behind a creche management dashboard. Platform staff and creche
//! managers use it to run enrollment, billing and support for many childcare facilities
//! ("creches") from one place, and it accepts enrollment leads from third-party form builders.
//!
//! ## Overview
//!
//! Each creche is a tenant. Students, applications (enrollment leads), invoices, support tickets,
//! events and webhook configurations all belong to exactly one creche. Dashboard users are either
//! platform staff (`admin`, `staff`), who see every creche, or a `creche_manager` scoped to their
//! own creche.
//!
//! ### Request Flow
//!
//! #### Lead ingestion (`POST /functions/v1/webhook/{webhook_key}`)
//!
//! Public and unauthenticated: the secret key in the path identifies a webhook configuration and
//! therefore a creche. The JSON body is turned into a new application with status `New`. Delivery
//! logging and the configuration's `last_used_at` happen on a detached task after the response is
//! decided. See [`webhooks`].
//!
//! #### Admin API (`/admin/api/v1/*`)
//!
//! Every handler takes a [`CurrentUser`](api::models::users::CurrentUser), resolved from the JWT
//! session cookie set by `POST /authentication/login`. Handlers check the caller's role and creche
//! scope through [`auth::permissions`] and call the [`Store`](db::Store). Read-only dashboard
//! aggregates are computed in memory by [`analytics`].
//!
//! ### Core Components
//!
//! The **storage layer** ([`db`]) is a single [`Store`](db::Store) trait with a PostgreSQL
//! implementation for production and an in-memory one for development and tests. Both enforce the
//! same unique and foreign-key constraints.
//!
//! The **configuration** ([`config`]) is loaded from YAML with `CRECHECTL_`-prefixed environment
//! overrides, and **telemetry** ([`telemetry`]) sets up structured logging with optional OTLP export.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use crechectl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = crechectl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     crechectl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;
pub mod webhooks;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
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
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    api::handlers,
    auth::{
        events::SessionEvents,
        password::{self, Argon2Params},
    },
    config::{CorsOrigin, DatabaseConfig, PoolSettings},
    db::{
        InMemoryStore, PostgresStore, Store,
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    openapi::ApiDoc,
    types::{Role, UserId},
};
pub use config::Config;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .store(Arc::new(InMemoryStore::new()))
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
    /// Sign-in/sign-out broadcast; one per process
    #[builder(default)]
    pub session_events: SessionEvents,
}

/// Get the crechectl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: an existing user with this email keeps its id and role, and only has its password
/// replaced when one is given. Called during startup so there is always someone who can sign in.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(
    store: &dyn Store,
    email: &str,
    password: Option<&str>,
    params: Argon2Params,
) -> errors::Result<UserId> {
    let password_hash = match password {
        Some(pwd) => Some(password::hash_password_blocking(pwd.to_string(), params).await?),
        None => None,
    };

    if let Some(existing) = store.get_user_by_email(email).await? {
        if password_hash.is_some() {
            store
                .update_user(
                    existing.id,
                    &UserUpdateDBRequest {
                        password_hash,
                        ..Default::default()
                    },
                )
                .await?;
        }
        return Ok(existing.id);
    }

    let created = store
        .create_user(&UserCreateDBRequest {
            email: email.to_string(),
            display_name: None,
            password_hash,
            role: Role::Admin,
            creche_id: None,
        })
        .await?;

    info!(user_id = %created.id, "created initial admin user");
    Ok(created.id)
}

async fn connect_postgres(url: &str, settings: &PoolSettings) -> anyhow::Result<PgPool> {
    let nonzero = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(nonzero(settings.idle_timeout_secs))
        .max_lifetime(nonzero(settings.max_lifetime_secs))
        .connect(url)
        .await?;

    migrator().run(&pool).await?;
    Ok(pool)
}

/// Create the store named by the configuration, run migrations and ensure the admin user exists.
async fn setup_store(config: &Config) -> anyhow::Result<(Arc<dyn Store>, Option<PgPool>)> {
    let (store, pool): (Arc<dyn Store>, Option<PgPool>) = match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory store: data will be lost on shutdown");
            (Arc::new(InMemoryStore::new()), None)
        }
        DatabaseConfig::External { url, pool } => {
            info!("Using external database");
            let pool = connect_postgres(url, pool).await?;
            (Arc::new(PostgresStore::new(pool.clone())), Some(pool))
        }
    };

    create_initial_admin_user(
        store.as_ref(),
        &config.admin_email,
        config.admin_password.as_deref(),
        config.auth.password.argon2_params(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

    Ok((store, pool))
}

/// Create CORS layer for the dashboard from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.cors;

    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Url keeps a trailing slash that browsers never send in Origin
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Public lead ingestion routes.
///
/// Both the bare base path (with and without a trailing slash) and `{base}/{webhook_key}` are
/// routed; the bare forms answer with "No webhook key provided".
fn webhook_routes(state: &AppState) -> Router {
    let base = state.config.ingest_base_path();
    let keyless = post(handlers::webhook_ingest::ingest_without_key).options(handlers::webhook_ingest::preflight);
    let keyed = post(handlers::webhook_ingest::ingest).options(handlers::webhook_ingest::preflight);

    let router = if base == "/" {
        Router::new().route("/", keyless).route("/{webhook_key}", keyed)
    } else {
        Router::new()
            .route(base, keyless.clone())
            .route(&format!("{base}/"), keyless)
            .route(&format!("{base}/{{webhook_key}}"), keyed)
    };

    router
        .layer(DefaultBodyLimit::max(state.config.webhooks.max_payload_bytes))
        .with_state(state.clone())
}

/// Build the main application router with all endpoints and middleware.
///
/// - Authentication routes at `/authentication/*`
/// - Admin API at `/admin/api/v1/*` and its docs at `/admin/docs`
/// - Lead ingestion at `webhooks.ingest_path`, outside the dashboard CORS policy
/// - Optional Prometheus metrics at `/internal/metrics`
/// - Tracing middleware around everything
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/authentication/login", post(handlers::auth::login))
        .route("/authentication/logout", post(handlers::auth::logout))
        .route("/authentication/session", get(handlers::auth::get_session))
        .route("/authentication/session/events", get(handlers::auth::session_events))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/creches", get(handlers::creches::list_creches).post(handlers::creches::create_creche))
        .route(
            "/creches/{id}",
            get(handlers::creches::get_creche).patch(handlers::creches::update_creche),
        )
        .route(
            "/students",
            get(handlers::students::list_students).post(handlers::students::create_student),
        )
        .route(
            "/applications",
            get(handlers::applications::list_applications).post(handlers::applications::create_application),
        )
        .route("/applications/{id}", patch(handlers::applications::update_application))
        .route(
            "/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route(
            "/support-tickets",
            get(handlers::support_tickets::list_support_tickets).post(handlers::support_tickets::create_support_ticket),
        )
        .route("/support-tickets/{id}", patch(handlers::support_tickets::update_support_ticket))
        .route(
            "/webhook-configurations",
            get(handlers::webhook_configurations::list_webhook_configurations)
                .post(handlers::webhook_configurations::create_webhook_configuration),
        )
        .route(
            "/webhook-configurations/{id}",
            patch(handlers::webhook_configurations::update_webhook_configuration)
                .delete(handlers::webhook_configurations::delete_webhook_configuration),
        )
        .route(
            "/webhook-configurations/{id}/rotate-key",
            post(handlers::webhook_configurations::rotate_webhook_key),
        )
        .route(
            "/webhook-configurations/{id}/logs",
            get(handlers::webhook_configurations::list_webhook_logs),
        )
        .route("/users", get(handlers::users::list_users).post(handlers::users::create_user))
        .route("/users/{id}", patch(handlers::users::update_user))
        .route("/events", get(handlers::events::list_events).post(handlers::events::create_event))
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route(
            "/notifications/{id}/read",
            patch(handlers::notifications::mark_notification_read),
        )
        .route("/analytics/summary", get(handlers::analytics::get_summary))
        .route("/analytics/provinces", get(handlers::analytics::get_provinces))
        .route("/analytics/utilization", get(handlers::analytics::get_utilization))
        .route("/analytics/revenue", get(handlers::analytics::get_revenue))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/admin/api/v1", api_routes)
        .merge(Scalar::with_url("/admin/docs", ApiDoc::openapi()));

    // Dashboard CORS applies to everything registered so far; the webhook routes carry their own
    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer).merge(webhook_routes(&state));

    // Add Prometheus metrics if enabled
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns the router and the store's resources.
///
/// # Lifecycle
///
/// 1. **Initialization**: [`Application::new`] opens the store, runs migrations and creates the
///    initial admin user
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests finish, the pool is closed
///    and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting crechectl with configuration: {:#?}", config);

        let (store, pool) = setup_store(&config).await?;

        let app_state = AppState::builder().store(store).config(config.clone()).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "crechectl listening on http://{}, lead ingestion at {}/{{webhook_key}}",
            bind_addr,
            self.config.ingest_base_path()
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::create_initial_admin_user;
    use crate::{
        auth::password::{Argon2Params, verify_password},
        db::{InMemoryStore, Store},
        test_utils::*,
        types::Role,
    };
    use axum::http::{HeaderValue, StatusCode, header};
    use serde_json::json;

    fn fast_params() -> Argon2Params {
        Argon2Params {
            memory_kib: 128,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[tokio::test]
    async fn test_initial_admin_user_is_idempotent() {
        let store = InMemoryStore::new();

        let first = create_initial_admin_user(&store, "admin@example.org", None, fast_params())
            .await
            .unwrap();
        let second = create_initial_admin_user(&store, "admin@example.org", Some("hunter2hunter2"), fast_params())
            .await
            .unwrap();
        assert_eq!(first, second);

        let admin = store.get_user_by_email("admin@example.org").await.unwrap().unwrap();
        assert_eq!(admin.parsed_role(), Ok(Role::Admin));
        let hash = admin.password_hash.expect("password was set on the second call");
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_health_and_docs() {
        let app = create_test_app();
        app.server.get("/healthz").await.assert_text("OK");
        app.server.get("/admin/docs").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_admin_api_requires_session() {
        let app = create_test_app();
        for path in ["/admin/api/v1/creches", "/admin/api/v1/analytics/summary", "/authentication/session"] {
            app.server.get(path).await.assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_oversized_webhook_payload_is_rejected() {
        let mut config = create_test_config();
        config.webhooks.max_payload_bytes = 64;
        let app = create_test_app_with_config(config);

        let message = "x".repeat(200);
        for path in ["/functions/v1/webhook/whk_anything", "/functions/v1/webhook"] {
            let response = app
                .server
                .post(path)
                .json(&json!({ "name": "Thandi", "message": message }))
                .await;
            response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
            assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
            let body: serde_json::Value = response.json();
            assert!(body["error"].as_str().is_some_and(|e| e.contains("length limit exceeded")));
        }
    }

    #[tokio::test]
    async fn test_custom_ingest_path_and_open_cors() {
        let mut config = create_test_config();
        config.webhooks.ingest_path = "/hooks/leads/".to_string();
        let app = create_test_app_with_config(config);

        let response = app
            .server
            .post("/hooks/leads")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://forms.example.net"))
            .json(&json!({ "name": "Thandi" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "No webhook key provided" }));
        assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");

        app.server
            .post("/functions/v1/webhook")
            .json(&json!({ "name": "Thandi" }))
            .await
            .assert_status_not_found();
    }
}
