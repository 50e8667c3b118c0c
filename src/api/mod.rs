use crate::api::handlers::{
    auth::{AuthConfig, AuthState, UserStore},
    health::Uptime,
    quiz::QuizState,
    quizzes::{QuizApiClient, QuizApiConfig},
    root,
};
use crate::quiz::Controller;
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::get,
    Extension, Json, Router,
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa_axum::router::OpenApiRouter;

pub mod email;
pub mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;

pub use openapi::openapi;

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Everything the server needs besides the listening port.
pub struct ServerConfig {
    pub dsn: Option<String>,
    pub auth: AuthConfig,
    pub jwt_secret: SecretString,
    pub controller: Controller,
    pub quiz_api: QuizApiConfig,
}

/// Shared handler state, injected as `Extension` layers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthState>,
    pub quiz: Arc<QuizState>,
    pub quiz_api: Arc<QuizApiClient>,
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, config: ServerConfig) -> Result<()> {
    let store = match &config.dsn {
        Some(dsn) => {
            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(5)
                .max_lifetime(Duration::from_secs(60 * 2))
                .test_before_acquire(true)
                .connect(dsn)
                .await
                .context("Failed to connect to database")?;
            UserStore::Postgres(pool)
        }
        None => {
            info!("No DSN configured, users are kept in memory");
            UserStore::memory()
        }
    };

    let state = AppState {
        auth: Arc::new(AuthState::new(
            config.auth,
            &config.jwt_secret,
            store,
            Arc::new(email::LogEmailSender),
        )),
        quiz: Arc::new(QuizState::new(config.controller)),
        quiz_api: Arc::new(QuizApiClient::new(config.quiz_api)?),
    };

    let app = app(state)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the full application: documented routes, `/`, `/openapi.json` and
/// the tower middleware stack.
///
/// # Errors
/// Returns an error if the frontend base URL cannot be turned into a CORS origin.
pub fn app(state: AppState) -> Result<Router> {
    let frontend_origin = frontend_origin(state.auth.config().frontend_base_url())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    // OpenAPI-wired routes first, then the undocumented `/` and the document itself.
    let (router, spec) = router().split_for_parts();
    let app = router
        .route("/", get(root::root))
        .route("/openapi.json", get(move || async move { Json(spec) }))
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
                .layer(cors)
                .layer(Extension(state.auth))
                .layer(Extension(state.quiz))
                .layer(Extension(state.quiz_api))
                .layer(Extension(Uptime::now())),
        );

    Ok(app)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
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

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}
