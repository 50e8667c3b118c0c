//! Map validated CLI matches to an action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, quiz, quizapi, ARG_DSN, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(5000);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .filter(|dsn| !dsn.trim().is_empty());

    let auth_opts = auth::Options::parse(matches)?;
    let quiz_opts = quiz::Options::parse(matches)?;
    let quizapi_opts = quizapi::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        frontend_base_url: auth_opts.frontend_base_url,
        jwt_secret: auth_opts.jwt_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        reset_token_ttl_seconds: auth_opts.reset_token_ttl_seconds,
        catalog: quiz_opts.catalog,
        question_count: quiz_opts.question_count,
        quizapi_url: quizapi_opts.url,
        quizapi_key: quizapi_opts.key,
        quizapi_host: quizapi_opts.host,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn builds_server_action() -> Result<()> {
        temp_env::with_vars(
            [
                ("QUIZZER_JWT_SECRET", Some("secret")),
                ("QUIZZER_DSN", Some("")),
                ("QUIZZER_QUESTION_COUNT", Some("5")),
                ("QUIZZER_PORT", None),
            ],
            || {
                let matches = commands::new().try_get_matches_from(["quizzer"])?;
                let Action::Server(args) = handler(&matches)?;
                assert_eq!(args.port, 5000);
                assert!(args.dsn.is_none());
                assert_eq!(args.question_count, Some(5));
                assert!(args.quizapi_key.is_none());
                Ok(())
            },
        )
    }
}
