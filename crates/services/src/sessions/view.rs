use serde::Serialize;

use quiz_core::QuestionId;

use super::service::{QuizPhase, QuizSession};

/// How an option should be highlighted. Only set once the page is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionMark {
    Unmarked,
    Correct,
    Incorrect,
}

/// Presentation-agnostic option row.
///
/// This is intentionally **not** a UI view-model: no markup, no pre-formatted strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub text: String,
    pub selected: bool,
    pub mark: OptionMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<OptionView>,
}

/// Everything the quiz screen needs for the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub page_index: usize,
    pub total_pages: usize,
    pub checked: bool,
    pub can_check: bool,
    pub can_advance: bool,
    pub finished: bool,
    pub questions: Vec<QuestionView>,
}

impl PageView {
    /// Snapshot of the current page, or `None` when no quiz is running.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let page_index = session.page_index()?;
        let checked = session.is_page_checked();

        let questions = session
            .current_page_questions()
            .iter()
            .map(|question| {
                let chosen = session.selection(question.id());
                let options = question
                    .options()
                    .iter()
                    .map(|text| {
                        let selected = chosen == Some(text.as_str());
                        let mark = match (checked, question.is_correct(text), selected) {
                            (false, _, _) => OptionMark::Unmarked,
                            (true, true, _) => OptionMark::Correct,
                            (true, false, true) => OptionMark::Incorrect,
                            (true, false, false) => OptionMark::Unmarked,
                        };
                        OptionView {
                            text: text.clone(),
                            selected,
                            mark,
                        }
                    })
                    .collect();
                QuestionView {
                    id: question.id(),
                    prompt: question.prompt().to_string(),
                    options,
                }
            })
            .collect();

        Some(Self {
            page_index,
            total_pages: session.total_pages(),
            checked,
            can_check: session.can_check(),
            can_advance: session.can_advance(),
            finished: session.phase() == QuizPhase::Finished,
            questions,
        })
    }
}
