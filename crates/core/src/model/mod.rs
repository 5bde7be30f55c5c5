pub mod bank;
pub mod group;
mod ids;
pub mod question;
pub mod range;

/// One raw spreadsheet row: ordered string cells, possibly ragged.
pub type Row = Vec<String>;

pub use bank::QuestionBank;
pub use group::{ALL_GROUP, Group, parse_groups, resolve_members};
pub use ids::{ParseIdError, QuestionId};
pub use question::{Question, QuestionError, parse_questions, parse_questions_with_thread_rng};
pub use range::{IdRange, RangeError, matches};

/// Returns the trimmed cell at `index`, or `""` when the row is too short.
pub(crate) fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", |value| value.trim())
}
