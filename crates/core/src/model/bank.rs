use rand::Rng;

use crate::model::{Group, Question, Row, parse_groups, parse_questions};

/// The loaded question and group tables. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
    groups: Vec<Group>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(questions: Vec<Question>, groups: Vec<Group>) -> Self {
        Self { questions, groups }
    }

    /// Build a bank from raw rows. Option order is fixed here via `rng`.
    pub fn from_rows<R: Rng + ?Sized>(
        question_rows: &[Row],
        group_rows: &[Row],
        rng: &mut R,
    ) -> Self {
        Self::new(parse_questions(question_rows, rng), parse_groups(group_rows))
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name() == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
