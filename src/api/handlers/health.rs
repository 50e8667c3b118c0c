use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};
use tracing::{debug, error};
use utoipa::ToSchema;

use super::auth::AuthState;
use crate::GIT_COMMIT_HASH;

/// Process start, used to report uptime.
#[derive(Clone, Copy, Debug)]
pub struct Uptime(pub Instant);

impl Uptime {
    #[must_use]
    pub fn now() -> Self {
        Self(Instant::now())
    }

    #[must_use]
    pub fn seconds(&self) -> u64 {
        self.0.elapsed().as_secs()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    status: String,
    storage: String,
    storage_backend: String,
    uptime_seconds: u64,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service and storage are healthy", body = Health),
        (status = 503, description = "Storage is unhealthy", body = Health)
    ),
    tag = "health"
)]
// axum handler for health
pub async fn health(
    auth: Extension<Arc<AuthState>>,
    uptime: Extension<Uptime>,
) -> impl IntoResponse {
    let storage = auth.store().ping().await;
    if let Err(err) = &storage {
        error!("Storage health check failed: {err:#}");
    }

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: if storage.is_ok() { "ok" } else { "error" }.to_string(),
        storage: if storage.is_ok() { "ok" } else { "error" }.to_string(),
        storage_backend: auth.store().backend().to_string(),
        uptime_seconds: uptime.seconds(),
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);
            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .unwrap_or_else(|err| {
            error!("Failed to parse X-App header: {}", err);
            HeaderMap::new()
        });

    let status = if storage.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, Json(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        email::LogEmailSender,
        handlers::auth::{AuthConfig, UserStore},
    };
    use anyhow::Result;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        routing::get,
        Router,
    };
    use secrecy::SecretString;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_memory_store() -> Result<()> {
        let auth = Arc::new(AuthState::new(
            AuthConfig::new("http://localhost:5173".to_string()),
            &SecretString::from("secret".to_string()),
            UserStore::memory(),
            Arc::new(LogEmailSender),
        ));
        let app = Router::new()
            .route("/api/health", get(health))
            .layer(Extension(auth))
            .layer(Extension(Uptime::now()));

        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-App"));
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(
            payload.get("storage").and_then(serde_json::Value::as_str),
            Some("ok")
        );
        assert_eq!(
            payload
                .get("storage_backend")
                .and_then(serde_json::Value::as_str),
            Some("memory")
        );
        assert_eq!(
            payload.get("name").and_then(serde_json::Value::as_str),
            Some(env!("CARGO_PKG_NAME"))
        );
        Ok(())
    }
}
