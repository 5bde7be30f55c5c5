use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{QuestionId, Row, cell};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("options must include the correct answer {correct:?}")]
    CorrectAnswerMissing { correct: String },
}

/// A multiple-choice question with its options already in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    correct_answer: String,
    options: Vec<String>,
}

impl Question {
    /// Creates a question; `options` is kept in the given order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` for a blank prompt and
    /// `QuestionError::CorrectAnswerMissing` if `options` lacks the correct answer.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        correct_answer: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let correct_answer = correct_answer.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if !options.contains(&correct_answer) {
            return Err(QuestionError::CorrectAnswerMissing {
                correct: correct_answer,
            });
        }
        Ok(Self {
            id,
            prompt,
            correct_answer,
            options,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

/// Parse `[id?, prompt, correct, distractor...]` rows into questions.
///
/// - rows with an empty prompt are skipped
/// - a missing or non-numeric id falls back to the 1-based position among kept rows;
///   group ranges match on this value, so the fallback is part of the data contract
/// - empty distractor cells are dropped
/// - options are shuffled once here with a uniform Fisher-Yates shuffle
/// - a repeated id keeps the first question
pub fn parse_questions<R: Rng + ?Sized>(rows: &[Row], rng: &mut R) -> Vec<Question> {
    let mut seen = HashSet::new();
    let mut questions = Vec::new();

    let kept = rows.iter().filter(|row| !cell(row, 1).is_empty());
    for (index, row) in kept.enumerate() {
        let position = index as u64 + 1;
        let id = match cell(row, 0) {
            "" => QuestionId::new(position),
            raw => raw.parse::<QuestionId>().unwrap_or_else(|err| {
                log::warn!("questions row {position}: {err}, using position id");
                QuestionId::new(position)
            }),
        };
        if !seen.insert(id) {
            log::warn!("questions row {position}: duplicate id {id}, skipping");
            continue;
        }

        let correct = cell(row, 2).to_string();
        let mut options = vec![correct.clone()];
        options.extend(
            row.iter()
                .skip(3)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string),
        );
        options.shuffle(rng);

        questions.push(Question {
            id,
            prompt: cell(row, 1).to_string(),
            correct_answer: correct,
            options,
        });
    }

    log::debug!("parsed {} questions from {} rows", questions.len(), rows.len());
    questions
}

/// [`parse_questions`] with the thread-local generator.
#[must_use]
pub fn parse_questions_with_thread_rng(rows: &[Row]) -> Vec<Question> {
    parse_questions(rows, &mut rand::rng())
}
