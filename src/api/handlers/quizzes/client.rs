//! HTTP client for the external QuizAPI catalog.
//!
//! Requests carry the `X-RapidAPI-Key`/`X-RapidAPI-Host` headers, time out
//! after [`REQUEST_TIMEOUT`] and are retried once on transport errors or 5xx.

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info_span, warn, Instrument};

use crate::APP_USER_AGENT;

pub const DEFAULT_BASE_URL: &str = "https://quizapi.io/api/v1";
pub const DEFAULT_HOST: &str = "quizapi.io";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum QuizApiError {
    #[error("quiz API key is not configured")]
    NotConfigured,
    #[error("quiz API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("quiz API answered {0}")]
    Status(StatusCode),
}

impl QuizApiError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::NotConfigured => false,
            Self::Request(err) => !err.is_decode(),
            Self::Status(status) => status.is_server_error(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuizApiConfig {
    base_url: String,
    host: String,
    api_key: Option<SecretString>,
}

impl QuizApiConfig {
    #[must_use]
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            api_key,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug)]
pub struct QuizApiClient {
    client: Client,
    config: QuizApiConfig,
}

impl QuizApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: QuizApiConfig) -> Result<Self, QuizApiError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &QuizApiConfig {
        &self.config
    }

    /// GET `{base_url}/{path}` and return the JSON body untouched.
    ///
    /// # Errors
    /// Returns [`QuizApiError::NotConfigured`] without an API key, otherwise
    /// the last transport or status error once the retry is spent.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, QuizApiError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(QuizApiError::NotConfigured)?;
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let mut attempt = 1;
        loop {
            let span = info_span!("quizapi.request", http.method = "GET", http.url = %url, attempt);
            let result = self
                .send(&url, api_key, params)
                .instrument(span)
                .await;
            match result {
                Err(err) if attempt < MAX_ATTEMPTS && err.is_retryable() => {
                    warn!("Retrying quiz API request: {err}");
                    attempt += 1;
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                other => return other,
            }
        }
    }

    async fn send(
        &self,
        url: &str,
        api_key: &SecretString,
        params: &[(&str, String)],
    ) -> Result<Value, QuizApiError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .header("X-RapidAPI-Key", api_key.expose_secret())
            .header("X-RapidAPI-Host", &self.config.host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuizApiError::Status(status));
        }
        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::{
        extract::Query, http::HeaderMap, response::IntoResponse, routing::get, Json, Router,
    };
    use serde_json::json;
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router.into_make_service()).await;
        });
        Ok(format!("http://{addr}"))
    }

    fn client(base_url: String, key: Option<&str>) -> Result<QuizApiClient> {
        let config = QuizApiConfig::new(key.map(|key| SecretString::from(key.to_string())))
            .with_base_url(base_url)
            .with_host("quiz.test".to_string());
        Ok(QuizApiClient::new(config)?)
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() -> Result<()> {
        let client = client("http://127.0.0.1:9".to_string(), None)?;
        assert!(!client.config().is_configured());
        let result = client.get("categories", &[]).await;
        assert!(matches!(result, Err(QuizApiError::NotConfigured)));
        Ok(())
    }

    #[tokio::test]
    async fn forwards_headers_and_query() -> Result<()> {
        let router = Router::new().route(
            "/questions",
            get(
                |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                    let key = headers
                        .get("X-RapidAPI-Key")
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string);
                    let host = headers
                        .get("X-RapidAPI-Host")
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string);
                    Json(json!({ "key": key, "host": host, "limit": params.get("limit") }))
                },
            ),
        );
        let base = serve(router).await?;
        let client = client(base, Some("k-123"))?;

        let body = client
            .get("/questions", &[("limit", "7".to_string())])
            .await?;
        assert_eq!(body, json!({ "key": "k-123", "host": "quiz.test", "limit": "7" }));
        Ok(())
    }

    #[tokio::test]
    async fn retries_once_on_server_error() -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/tags",
            get(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        StatusCode::SERVICE_UNAVAILABLE.into_response()
                    } else {
                        Json(json!([{ "id": 1, "name": "Linux" }])).into_response()
                    }
                }
            }),
        );
        let base = serve(router).await?;
        let client = client(base, Some("key"))?;

        let body = client.get("tags", &[]).await?;
        assert_eq!(body, json!([{ "id": 1, "name": "Linux" }]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn gives_up_after_second_failure() -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/categories",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { StatusCode::BAD_GATEWAY }
            }),
        );
        let base = serve(router).await?;
        let client = client(base, Some("key"))?;

        let result = client.get("categories", &[]).await;
        assert!(matches!(
            result,
            Err(QuizApiError::Status(StatusCode::BAD_GATEWAY))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/categories",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { StatusCode::UNAUTHORIZED }
            }),
        );
        let base = serve(router).await?;
        let client = client(base, Some("bad-key"))?;

        let result = client.get("categories", &[]).await;
        assert!(matches!(
            result,
            Err(QuizApiError::Status(StatusCode::UNAUTHORIZED))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }
}
