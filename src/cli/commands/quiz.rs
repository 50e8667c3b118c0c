use clap::{Arg, ArgMatches, Command};

pub const ARG_CATALOG: &str = "catalog";
pub const ARG_QUESTION_COUNT: &str = "question-count";

#[derive(Debug, Clone, Default)]
pub struct Options {
    /// JSON catalog path; the embedded catalog is used when unset.
    pub catalog: Option<String>,
    /// Planned questions per session; the catalog size when unset.
    pub question_count: Option<usize>,
}

impl Options {
    /// Parse quiz arguments from matches.
    ///
    /// # Errors
    /// Never fails today; kept fallible like the other option groups.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        Ok(Self {
            catalog: matches
                .get_one::<String>(ARG_CATALOG)
                .cloned()
                .filter(|value| !value.trim().is_empty()),
            question_count: matches.get_one::<usize>(ARG_QUESTION_COUNT).copied(),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CATALOG)
                .long(ARG_CATALOG)
                .help("Path to a JSON question catalog (default: embedded catalog)")
                .env("QUIZZER_CATALOG"),
        )
        .arg(
            Arg::new(ARG_QUESTION_COUNT)
                .long(ARG_QUESTION_COUNT)
                .help("Questions per quiz session (default: catalog size)")
                .env("QUIZZER_QUESTION_COUNT")
                .value_parser(clap::value_parser!(usize)),
        )
}
