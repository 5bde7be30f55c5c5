use serde::Serialize;
use thiserror::Error;

use crate::model::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RangeError {
    #[error("range token {token:?} is not numeric")]
    NotNumeric { token: String },

    #[error("range start {start} is greater than end {end}")]
    Malformed { start: u64, end: u64 },
}

/// Inclusive `[start, end]` span of question ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdRange {
    start: u64,
    end: u64,
}

impl IdRange {
    /// Creates a range covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns `RangeError::Malformed` if `start > end`. Reversed bounds are rejected
    /// rather than swapped.
    pub fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Malformed { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range containing exactly one id.
    #[must_use]
    pub fn single(id: u64) -> Self {
        Self { start: id, end: id }
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        (self.start..=self.end).contains(&id.value())
    }

    /// Parse one token of a range spec: `"12"` or `"1-184"`.
    ///
    /// # Errors
    ///
    /// Returns `RangeError::NotNumeric` for empty or non-numeric bounds and
    /// `RangeError::Malformed` for reversed bounds.
    pub fn parse_token(token: &str) -> Result<Self, RangeError> {
        let token = token.trim();
        let not_numeric = || RangeError::NotNumeric {
            token: token.to_string(),
        };
        let bound = |raw: &str| raw.trim().parse::<u64>().map_err(|_| not_numeric());

        match token.split_once('-') {
            Some((start, end)) => Self::new(bound(start)?, bound(end)?),
            None => bound(token).map(Self::single),
        }
    }
}

/// True iff `id` lies inside at least one of `ranges`. An empty list never matches.
#[must_use]
pub fn matches(id: QuestionId, ranges: &[IdRange]) -> bool {
    ranges.iter().any(|range| range.contains(id))
}
