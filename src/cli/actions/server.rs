use crate::{
    api::{
        self,
        handlers::{auth::AuthConfig, quizzes::QuizApiConfig},
        ServerConfig,
    },
    quiz::{Catalog, Controller},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{fmt::Write as _, sync::Arc};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub frontend_base_url: String,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub reset_token_ttl_seconds: i64,
    pub catalog: Option<String>,
    pub question_count: Option<usize>,
    pub quizapi_url: String,
    pub quizapi_key: Option<SecretString>,
    pub quizapi_host: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the catalog cannot be loaded, the database is unreachable,
/// or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load question catalog: {path}"))?,
        None => Catalog::builtin().context("Failed to load embedded question catalog")?,
    };
    info!(questions = catalog.len(), "Question catalog loaded");

    let controller = Controller::new(Arc::new(catalog)).with_question_count(args.question_count);

    let auth = AuthConfig::new(args.frontend_base_url)
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_reset_token_ttl_seconds(args.reset_token_ttl_seconds);

    let quiz_api = QuizApiConfig::new(args.quizapi_key)
        .with_base_url(args.quizapi_url)
        .with_host(args.quizapi_host);

    api::new(
        args.port,
        ServerConfig {
            dsn: args.dsn,
            auth,
            jwt_secret: args.jwt_secret,
            controller,
            quiz_api,
        },
    )
    .await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        (
            "dsn",
            args.dsn
                .as_deref()
                .map_or_else(|| "memory".to_string(), redact_dsn),
        ),
        ("frontend_base_url", args.frontend_base_url.clone()),
        ("token_ttl_seconds", args.token_ttl_seconds.to_string()),
        (
            "reset_token_ttl_seconds",
            args.reset_token_ttl_seconds.to_string(),
        ),
        (
            "catalog",
            args.catalog.clone().unwrap_or_else(|| "embedded".to_string()),
        ),
        (
            "question_count",
            args.question_count
                .map_or_else(|| "catalog size".to_string(), |count| count.to_string()),
        ),
        ("quizapi_url", args.quizapi_url.clone()),
        ("quizapi_host", args.quizapi_host.clone()),
        ("quizapi_key_set", args.quizapi_key.is_some().to_string()),
    ];
    info!("{}", startup_message(&entries));
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn startup_message(entries: &[(&str, String)]) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ = write!(message, "\n  {key}:{padding} {value}");
    }
    message
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
