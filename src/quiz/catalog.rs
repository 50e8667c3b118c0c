//! Read-only question catalog partitioned by difficulty tier.
//!
//! The catalog is loaded once at startup, either from the embedded
//! `data/questions.json` or from a file given on the command line, and shared
//! by every quiz session. Loading validates the records so the controller can
//! rely on unique ids and on answers that are one of the four options.

use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs,
    path::Path,
};
use thiserror::Error;
use utoipa::ToSchema;

const BUILTIN_CATALOG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/questions.json"
));

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog json")]
    Json(#[from] serde_json::Error),
    #[error("duplicate question id: {0}")]
    DuplicateId(u32),
    #[error("question {id} has {count} options, expected 4")]
    OptionCount { id: u32, count: usize },
    #[error("question {0} has a blank option")]
    BlankOption(u32),
    #[error("question {0} correct answer is not one of its options")]
    AnswerNotInOptions(u32),
}

/// Difficulty tier of a question.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn step_up(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium | Self::Hard => Self::Hard,
        }
    }

    #[must_use]
    pub const fn step_down(self) -> Self {
        match self {
            Self::Hard => Self::Medium,
            Self::Medium | Self::Easy => Self::Easy,
        }
    }

    /// Tier for the next question after an answer at this tier.
    #[must_use]
    pub const fn after_answer(self, is_correct: bool) -> Self {
        if is_correct {
            self.step_up()
        } else {
            self.step_down()
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub difficulty: Difficulty,
    /// Declared value from the catalog. Scoring does not use it.
    pub points: u32,
    pub explanation: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    easy: Vec<QuestionRecord>,
    #[serde(default)]
    medium: Vec<QuestionRecord>,
    #[serde(default)]
    hard: Vec<QuestionRecord>,
}

/// On-disk shape of a single question; the tier comes from the enclosing key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    id: u32,
    #[serde(rename = "question")]
    text: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    points: u32,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl QuestionRecord {
    fn into_question(self, difficulty: Difficulty) -> Question {
        Question {
            id: self.id,
            text: self.text,
            options: self.options,
            correct_answer: self.correct_answer,
            difficulty,
            points: self.points,
            explanation: self.explanation,
            tags: self.tags,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tiers: BTreeMap<Difficulty, Vec<Question>>,
    index: HashMap<u32, (Difficulty, usize)>,
}

impl Catalog {
    /// Catalog embedded in the binary.
    ///
    /// # Errors
    /// Returns an error if the embedded json fails validation.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load a catalog file with the same layout as the embedded one.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse `{"easy": [...], "medium": [...], "hard": [...]}`; missing tiers are empty.
    ///
    /// # Errors
    /// Returns an error on malformed json or invalid questions.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        let tiers = [
            (Difficulty::Easy, file.easy),
            (Difficulty::Medium, file.medium),
            (Difficulty::Hard, file.hard),
        ];
        Self::from_questions(tiers.into_iter().flat_map(|(difficulty, records)| {
            records
                .into_iter()
                .map(move |record| record.into_question(difficulty))
        }))
    }

    /// Build a catalog from questions already tagged with their tier.
    ///
    /// # Errors
    /// Returns an error if ids repeat or a question is malformed.
    pub fn from_questions(
        questions: impl IntoIterator<Item = Question>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for question in questions {
            validate(&question)?;
            let tier = catalog.tiers.entry(question.difficulty).or_default();
            if catalog
                .index
                .insert(question.id, (question.difficulty, tier.len()))
                .is_some()
            {
                return Err(CatalogError::DuplicateId(question.id));
            }
            tier.push(question);
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn tier(&self, difficulty: Difficulty) -> &[Question] {
        self.tiers.get(&difficulty).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn question(&self, id: u32) -> Option<&Question> {
        let (difficulty, position) = self.index.get(&id)?;
        self.tiers.get(difficulty)?.get(*position)
    }

    /// All questions, easy tier first.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        Difficulty::ALL
            .into_iter()
            .flat_map(move |difficulty| self.tier(difficulty).iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn validate(question: &Question) -> Result<(), CatalogError> {
    if question.options.len() != OPTIONS_PER_QUESTION {
        return Err(CatalogError::OptionCount {
            id: question.id,
            count: question.options.len(),
        });
    }
    if question.options.iter().any(|option| option.trim().is_empty()) {
        return Err(CatalogError::BlankOption(question.id));
    }
    if !question.options.contains(&question.correct_answer) {
        return Err(CatalogError::AnswerNotInOptions(question.id));
    }
    Ok(())
}
