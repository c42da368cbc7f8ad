//! # coursectl: users and the courses they own
//!
//! `coursectl` is a small REST service for a course catalogue. Anyone can register an account
//! and browse courses; authenticated users can create courses and change or remove the ones
//! they own.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum); persistence is SQLite through
//! sqlx, with migrations applied at startup.
//!
//! ### Request Flow
//!
//! Each request is handled in a single task. Protected routes take a
//! [`CurrentUser`](api::models::users::CurrentUser) argument, whose extractor decodes the
//! `Authorization: Basic` header and verifies the password against the stored argon2 hash.
//! The handler then validates the JSON body ([`api::validation`]), runs its queries through a
//! repository ([`db::handlers`]), applies the ownership check for course mutations
//! ([`auth::permissions`]) and returns. Any failure is an [`errors::Error`], which renders a
//! JSON body with the matching status code.
//!
//! ### Routes
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | GET | `/users` | yes |
//! | POST | `/users` | no |
//! | GET | `/courses` | no |
//! | GET | `/courses/{id}` | no |
//! | POST | `/courses` | yes |
//! | PUT | `/courses/{id}` | yes, owner only |
//! | DELETE | `/courses/{id}` | yes, owner only |
//!
//! Every route is also available under `/api`. `/healthz` reports liveness, `/docs` serves the
//! API reference and `/api-docs/openapi.json` the raw OpenAPI document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use coursectl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = coursectl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     coursectl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     Application::new(config)
//!         .await?
//!         .serve(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod types;

use crate::{
    api::handlers::{courses, users},
    config::CorsOrigin,
    openapi::ApiDoc,
};
use axum::{
    Json, Router, ServiceExt,
    extract::Request,
    http::{self, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
};
use bon::Builder;
use serde_json::json;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
pub use types::{CourseId, UserId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the coursectl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the configured SQLite database and bring its schema up to date.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = config
        .database
        .pool
        .apply(SqlitePoolOptions::new())
        .connect_with(options)
        .await?;

    migrator().run(&pool).await?;
    Ok(pool)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

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
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers([http::header::LOCATION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Route not found" })))
}

/// Build the application router: the users and courses API mounted at the root and under
/// `/api`, plus health, documentation, CORS and request tracing.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/users", get(users::get_current_user).post(users::create_user))
        .route("/courses", get(courses::list_courses).post(courses::create_course))
        .route(
            "/courses/{id}",
            get(courses::get_course).put(courses::update_course).delete(courses::delete_course),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .nest("/api", api_routes.clone())
        .merge(api_routes)
        .fallback(route_not_found)
        .layer(create_cors_layer(&state.config)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

fn trim_trailing_slash(router: Router) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// A configured server: database opened and migrated, router built.
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application around an existing pool, or open one from the config if `None`
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!("Starting coursectl with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        let service = trim_trailing_slash(self.router);
        axum_test::TestServer::new(ServiceExt::<Request>::into_make_service(service))
            .expect("Failed to create test server")
    }

    /// Serve until `shutdown` resolves, then close the pool and flush telemetry
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "coursectl listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Trailing slashes are stripped before path matching, so `/courses/` routes like `/courses`
        let service = trim_trailing_slash(self.router);
        axum::serve(listener, ServiceExt::<Request>::into_make_service(service))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::Value;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_healthz(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get("/healthz").await;

        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_openapi_document_served(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get("/api-docs/openapi.json").await;

        response.assert_status_ok();
        let doc: Value = response.json();
        assert!(doc["paths"]["/courses/{id}"].is_object());
        assert!(doc["components"]["securitySchemes"]["BasicAuth"].is_object());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_route_returns_json_404(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get("/nope").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&serde_json::json!({ "message": "Route not found" }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_trailing_slash_is_ignored(pool: SqlitePool) {
        let user = create_test_user(&pool, "joe@smith.com").await;
        create_test_course(&pool, user.id, "Rust").await;
        let app = create_test_app(pool).await;

        let response = app.get("/api/courses/").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>().as_array().unwrap().len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cors_exposes_location(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get("/courses").add_header("origin", "https://app.example.com").await;

        response.assert_status_ok();
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(response.headers().get("access-control-expose-headers").unwrap(), "location");
    }

    #[tokio::test]
    async fn test_application_opens_database_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = create_test_config();
        config.database.url = format!("sqlite://{}", dir.path().join("coursectl.db").display());

        let app = crate::Application::new(config).await.unwrap().into_test_server();

        app.get("/courses").await.assert_status_ok();
        assert!(dir.path().join("coursectl.db").exists());
    }
}
