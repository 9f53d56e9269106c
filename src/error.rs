//! Error types shared across the interview bot.

use thiserror::Error;

use crate::quiz::interview::Stage;

/// Errors emitted by the interview state machine.
///
/// None of these change the interview: the caller re-prompts and tries again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InterviewError {
    #[error("candidate name must not be empty")]
    EmptyName,
    #[error("question count must be between {min} and {max}, got {requested}")]
    QuestionCountOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },
    #[error("operation not allowed while the interview is {actual:?}")]
    WrongStage { actual: Stage },
    #[error("the interview has no questions")]
    NoQuestions,
}

/// Errors from one attempt at generating a question remotely.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("the API key was rejected: {0}")]
    Credentials(String),
    #[error(transparent)]
    ChatGpt(#[from] chatgpt::err::Error),
    #[error("response is not a question object: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("generated question is invalid: {0}")]
    InvalidShape(String),
}

/// Errors emitted by the leaderboard store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("leaderboard lock was poisoned")]
    Poisoned,
}

/// Errors emitted while reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}
