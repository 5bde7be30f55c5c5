//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::QuestionId;
use sheets::SourceError;

use crate::sessions::QuizPhase;

/// Errors emitted while validating `QuizSettings`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("page size must be > 0")]
    InvalidPageSize,
}

/// Errors emitted by `BankLoader`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("failed to fetch table {table:?}: {source}")]
    Fetch {
        table: String,
        #[source]
        source: SourceError,
    },
}

/// Operations called out of order or with data the current page cannot accept.
///
/// These indicate a presentation-layer bug: the UI should have disabled the action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreconditionError {
    #[error("{} question(s) on this page are unanswered", missing.len())]
    Unanswered { missing: Vec<QuestionId> },

    #[error("page {page} is already checked")]
    PageLocked { page: usize },

    #[error("page {page} must be checked before advancing")]
    PageNotChecked { page: usize },

    #[error("page {page} is the last page")]
    NoNextPage { page: usize },

    #[error("question {id} is not on the current page")]
    QuestionNotOnPage { id: QuestionId },

    #[error("{option:?} is not an option of question {id}")]
    UnknownOption { id: QuestionId, option: String },
}

/// Errors emitted by `QuizSession`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("group {group:?} has no questions")]
    EmptyWorkingSet { group: String },

    #[error("unknown group {0:?}")]
    UnknownGroup(String),

    #[error("no quiz in progress (phase: {phase:?})")]
    NotActive { phase: QuizPhase },

    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}
