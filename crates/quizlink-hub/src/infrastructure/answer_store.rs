//! Out-of-band expected-answer lookup.
//!
//! Besides the live device session, the controller site can ask whether a
//! typed answer is correct for a stored question.  Answers live in a
//! key/value document keyed by question id.  The coordinator never uses this
//! lookup; it is consumed by the `check-answer` subcommand.
//!
//! # Answer file format
//!
//! ```toml
//! [questions.capital-of-france]
//! correctAnswer = "Paris"
//!
//! [questions.q17]
//! correctAnswer = "04A1B2C3"
//! ```
//!
//! Typed answers are compared leniently (whitespace and case are ignored),
//! unlike tag ids on the device path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quizlink_core::answers_match_leniently;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error type for answer lookups.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The answer file could not be read.
    #[error("I/O error reading answers at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The answer file is not valid TOML or has the wrong shape.
    #[error("failed to parse answers TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// No expected answer is stored for the question.
    #[error("no answer stored for question '{0}'")]
    QuestionNotFound(String),
}

/// Source of expected answers, keyed by question id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerStore: Send + Sync {
    /// Returns the stored answer, or `None` if the question is unknown.
    async fn expected_answer(&self, question_id: &str) -> Result<Option<String>, StoreError>;
}

/// Verdict returned by the lookup, serialised as
/// `{"correct":bool,"message":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupVerdict {
    pub correct: bool,
    pub message: String,
}

impl LookupVerdict {
    fn from_match(correct: bool) -> Self {
        let message = if correct {
            "Correct answer!"
        } else {
            "Incorrect answer!"
        };
        Self {
            correct,
            message: message.to_string(),
        }
    }
}

/// Looks up the stored answer for `question_id` and compares it to `answer`.
///
/// # Errors
///
/// Returns [`StoreError::QuestionNotFound`] if no answer is stored, or the
/// store's own error if the lookup fails.
pub async fn check_submitted_answer(
    store: &dyn AnswerStore,
    question_id: &str,
    answer: &str,
) -> Result<LookupVerdict, StoreError> {
    let expected = store
        .expected_answer(question_id)
        .await?
        .ok_or_else(|| StoreError::QuestionNotFound(question_id.to_string()))?;

    let correct = answers_match_leniently(answer, &expected);
    debug!("lookup for '{question_id}': correct={correct}");
    Ok(LookupVerdict::from_match(correct))
}

// ── TOML-file store ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AnswerFile {
    #[serde(default)]
    questions: HashMap<String, QuestionEntry>,
}

#[derive(Debug, Deserialize)]
struct QuestionEntry {
    #[serde(rename = "correctAnswer", alias = "correct_answer")]
    correct_answer: String,
}

/// [`AnswerStore`] loaded once from a TOML file.
#[derive(Debug, Default)]
pub struct TomlAnswerStore {
    answers: HashMap<String, String>,
}

impl TomlAnswerStore {
    /// Reads and parses the answer file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::Parse`] if it is not a valid answer file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses answer-file contents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] on malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, StoreError> {
        let file: AnswerFile = toml::from_str(text)?;
        let answers = file
            .questions
            .into_iter()
            .map(|(id, entry)| (id, entry.correct_answer))
            .collect();
        Ok(Self { answers })
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

#[async_trait]
impl AnswerStore for TomlAnswerStore {
    async fn expected_answer(&self, question_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.answers.get(question_id).cloned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
