use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::api::handlers::quizzes::client::{DEFAULT_BASE_URL, DEFAULT_HOST};

pub const ARG_QUIZAPI_URL: &str = "quizapi-url";
pub const ARG_QUIZAPI_KEY: &str = "quizapi-key";
pub const ARG_QUIZAPI_HOST: &str = "quizapi-host";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub key: Option<SecretString>,
    pub host: String,
}

impl Options {
    /// Parse QuizAPI arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL is not a valid absolute URL.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Helper to filter empty strings which clap might pass through if env vars are set to ""
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let url = get_non_empty(ARG_QUIZAPI_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&url)
            .map_err(|err| anyhow::anyhow!("invalid --{ARG_QUIZAPI_URL} {url}: {err}"))?;

        Ok(Self {
            url,
            key: get_non_empty(ARG_QUIZAPI_KEY).map(SecretString::from),
            host: get_non_empty(ARG_QUIZAPI_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_QUIZAPI_URL)
                .long(ARG_QUIZAPI_URL)
                .help("QuizAPI base URL")
                .env("QUIZZER_QUIZAPI_URL")
                .default_value(DEFAULT_BASE_URL),
        )
        .arg(
            Arg::new(ARG_QUIZAPI_KEY)
                .long(ARG_QUIZAPI_KEY)
                .help("QuizAPI key sent as X-RapidAPI-Key; proxy routes answer 503 without it")
                .env("QUIZZER_QUIZAPI_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_QUIZAPI_HOST)
                .long(ARG_QUIZAPI_HOST)
                .help("Value sent as X-RapidAPI-Host")
                .env("QUIZZER_QUIZAPI_HOST")
                .default_value(DEFAULT_HOST),
        )
}
