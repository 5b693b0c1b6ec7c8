use crate::openid::IdentityProvider;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
    Extension, Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
pub(crate) mod pages;

mod openapi;

pub use openapi::openapi;

/// Build the application router.
///
/// Kept separate from [`new`] so flow tests can drive the router directly
/// with a stub identity provider.
#[must_use]
pub fn app(pool: SqlitePool, provider: Arc<dyn IdentityProvider>) -> Router {
    // Server-side sessions, the cookie only carries the session id.
    let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);

    Router::new()
        .route("/", get(handlers::index::index))
        .route(
            "/login",
            get(handlers::login::login).post(handlers::login::submit),
        )
        .route(
            "/create-profile",
            get(handlers::create_profile::form).post(handlers::create_profile::submit),
        )
        .route(
            "/profile",
            get(handlers::profile::form).post(handlers::profile::submit),
        )
        .route("/logout", get(handlers::logout::logout))
        .route("/health", get(handlers::health::health))
        .route("/openapi.json", get(openapi::serve))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(session_layer)
                .layer(Extension(provider))
                .layer(Extension(pool)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, provider: Arc<dyn IdentityProvider>) -> Result<()> {
    // Connect to database
    let options = SqliteConnectOptions::from_str(&dsn)
        .with_context(|| format!("Invalid database DSN: {dsn}"))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let app = app(pool, provider);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to install ctrl-c handler: {err}");
        return;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
