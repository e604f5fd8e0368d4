//! # greenlight: a JSON API for a movie catalog
//!
//! `greenlight` serves a catalog of movies over HTTP, along with the user accounts and bearer
//! tokens that gate access to it.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). Records live either in a
//! process-local store (the default, for development and tests) or in PostgreSQL.
//!
//! ### Request Flow
//!
//! Every request under `/v1` first passes through [`auth::middleware::authenticate`], which
//! resolves an `Authorization: Bearer <token>` header to a user, or to an anonymous caller when no
//! header is sent. Handlers in [`api::handlers`] then decode the request with strict extractors,
//! delegate to a manager in [`services`], and wrap the result in a response envelope. Movie routes
//! additionally require the caller to be an activated user.
//!
//! ### Core Components
//!
//! - **[`api`]**: routes, request/response models, extractors
//! - **[`services`]**: movie, account and token business rules
//! - **[`db`]**: the store traits and their in-memory and Postgres implementations
//! - **[`auth`]**: password hashing, token generation, request authentication
//! - **[`validator`]**: field-error accumulation shared by every validation rule
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use greenlight::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = greenlight::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     greenlight::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await
//! }
//! ```
//!
//! ## Database Setup
//!
//! With `database.type: external` (or `DATABASE_URL` set) migrations run on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! greenlight::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod services;
pub mod telemetry;
pub mod types;
pub mod validator;

#[cfg(test)]
pub mod test_utils;

use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{Method, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    auth::middleware::authenticate,
    config::DatabaseConfig,
    db::{InMemoryStore, PostgresStore, Store},
    errors::Error,
    openapi::ApiDoc,
};

pub use types::{MovieId, TokenScope, UserId};

/// Application state shared across all request handlers.
///
/// - `store`: the record store every manager is built on
/// - `config`: application configuration loaded from file and environment
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
}

/// Get the database migrator.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

async fn not_found() -> Error {
    Error::not_found("Resource", "<unmatched route>")
}

async fn method_not_allowed(method: Method) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({
            "error": format!("the {method} method is not supported for this resource")
        })),
    )
}

/// Build the application router.
///
/// Every `/v1` route runs behind the authentication middleware and the configured body limit.
/// The OpenAPI document is served at `/v1/openapi.json` and rendered at `/v1/docs`.
pub fn build_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/healthcheck", get(api::handlers::healthcheck::healthcheck))
        .route(
            "/movies",
            get(api::handlers::movies::list_movies).post(api::handlers::movies::create_movie),
        )
        .route(
            "/movies/{id}",
            get(api::handlers::movies::show_movie)
                .patch(api::handlers::movies::update_movie)
                .delete(api::handlers::movies::delete_movie),
        )
        .route("/users", post(api::handlers::users::register_user))
        .route("/users/activated", put(api::handlers::users::activate_user))
        .route(
            "/tokens/authentication",
            post(api::handlers::tokens::create_authentication_token),
        )
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(state.config.limits.max_body_bytes))
        .layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state);

    Router::new()
        .nest("/v1", v1)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Create the configured store. For Postgres, also returns the pool so it can be closed on
/// shutdown.
async fn setup_store(config: &Config) -> anyhow::Result<(Arc<dyn Store>, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory store: data will be lost on shutdown");
            Ok((Arc::new(InMemoryStore::new()), None))
        }
        DatabaseConfig::External { url, pool } => {
            info!("Using external database");
            let db = PgPoolOptions::new()
                .max_connections(pool.max_connections)
                .min_connections(pool.min_connections)
                .acquire_timeout(Duration::from_secs(pool.acquire_timeout_secs))
                .idle_timeout((pool.idle_timeout_secs > 0).then(|| Duration::from_secs(pool.idle_timeout_secs)))
                .connect(url)
                .await?;

            migrator().run(&db).await?;
            Ok((Arc::new(PostgresStore::new(db.clone())), Some(db)))
        }
    }
}

/// Main application struct that owns the router and its resources.
///
/// 1. **Create**: [`Application::new`] opens the store and runs migrations
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: when the shutdown signal resolves, in-flight requests finish, then the pool
///    and telemetry are closed
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting greenlight with configuration: {:#?}", config);

        let (store, pool) = setup_store(&config).await?;
        let state = AppState::builder().store(store).config(config.clone()).build();
        let router = build_router(state);

        Ok(Self { router, config, pool })
    }

    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            environment = %self.config.environment,
            "Greenlight listening on http://{}, available at http://localhost:{}",
            bind_addr,
            self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
