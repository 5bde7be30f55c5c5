use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use quiz_core::model::resolve_members;
use quiz_core::{Question, QuestionBank, QuestionId};

use super::progress::{PageResult, QuizProgress};
use super::selection::GroupSelection;
use crate::error::{PreconditionError, QuizError};
use crate::settings::QuizSettings;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where the session is in the select → answer → check → advance flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Choosing a group and order; no run exists.
    Selecting,
    /// The last `start` matched no questions.
    Empty,
    /// Paging through questions.
    Active,
    /// The last page has been checked.
    Finished,
}

//
// ─── RUN ───────────────────────────────────────────────────────────────────────
//

/// State of one started quiz. Replaced wholesale on every `start`.
#[derive(Debug, Clone)]
struct QuizRun {
    working_set: Vec<Question>,
    page_size: usize,
    page_index: usize,
    selections: HashMap<QuestionId, String>,
    page_results: BTreeMap<usize, PageResult>,
}

impl QuizRun {
    fn total_pages(&self) -> usize {
        self.working_set.len().div_ceil(self.page_size)
    }

    fn is_last_page(&self) -> bool {
        self.page_index + 1 >= self.total_pages()
    }

    fn is_checked(&self) -> bool {
        self.page_results.contains_key(&self.page_index)
    }

    fn page(&self) -> &[Question] {
        let start = self.page_index * self.page_size;
        let end = (start + self.page_size).min(self.working_set.len());
        &self.working_set[start..end]
    }

    fn missing(&self) -> Vec<QuestionId> {
        self.page()
            .iter()
            .map(Question::id)
            .filter(|id| !self.selections.contains_key(id))
            .collect()
    }

    fn score_page(&self) -> PageResult {
        let page = self.page();
        let correct = page
            .iter()
            .filter(|q| {
                self.selections
                    .get(&q.id())
                    .is_some_and(|chosen| q.is_correct(chosen))
            })
            .count();
        PageResult {
            correct,
            wrong: page.len() - correct,
        }
    }
}

enum Stage {
    Selecting,
    Empty,
    Running(QuizRun),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session over a loaded `QuestionBank`.
///
/// Owns the group/order draft chosen on the selection screen and, once started,
/// the working set with its paging, selections and per-page results. Every
/// mutation goes through a method here; rejected calls leave state untouched.
pub struct QuizSession {
    bank: Arc<QuestionBank>,
    settings: QuizSettings,
    group: GroupSelection,
    random_order: bool,
    stage: Stage,
    rng: StdRng,
}

impl QuizSession {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, settings: QuizSettings) -> Self {
        Self {
            bank,
            settings,
            group: GroupSelection::All,
            random_order: false,
            stage: Stage::Selecting,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Use a deterministic generator for question-order shuffles.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn settings(&self) -> QuizSettings {
        self.settings
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match &self.stage {
            Stage::Selecting => QuizPhase::Selecting,
            Stage::Empty => QuizPhase::Empty,
            Stage::Running(run) if run.is_last_page() && run.is_checked() => QuizPhase::Finished,
            Stage::Running(_) => QuizPhase::Active,
        }
    }

    // ─── Selection screen ─────────────────────────────────────────────────────

    /// `ALL` followed by every group name, in table order.
    #[must_use]
    pub fn available_groups(&self) -> Vec<&str> {
        std::iter::once(GroupSelection::All.name())
            .chain(self.bank.groups().iter().map(|g| g.name()))
            .collect()
    }

    #[must_use]
    pub fn selected_group(&self) -> &GroupSelection {
        &self.group
    }

    #[must_use]
    pub fn random_order(&self) -> bool {
        self.random_order
    }

    /// Change the group used by the next `start`. A running quiz is not affected.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownGroup` if the bank has no such group.
    pub fn set_group(&mut self, group: GroupSelection) -> Result<(), QuizError> {
        if let GroupSelection::Named(name) = &group {
            if self.bank.group(name).is_none() {
                return Err(QuizError::UnknownGroup(name.clone()));
            }
        }
        self.group = group;
        Ok(())
    }

    /// [`QuizSession::set_group`] by picker name, `ALL` included.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownGroup` if the bank has no such group.
    pub fn set_group_name(&mut self, name: &str) -> Result<(), QuizError> {
        self.set_group(GroupSelection::from_name(name))
    }

    /// Toggle question-order shuffling for the next `start`.
    pub fn set_random_order(&mut self, random_order: bool) {
        self.random_order = random_order;
    }

    /// Build a fresh working set from the current draft and reset all quiz state.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyWorkingSet` when the selection matches no questions;
    /// the session is then in `QuizPhase::Empty`.
    pub fn start(&mut self) -> Result<QuizPhase, QuizError> {
        let mut working_set = match &self.group {
            GroupSelection::All => self.bank.questions().to_vec(),
            GroupSelection::Named(name) => {
                let group = self
                    .bank
                    .group(name)
                    .ok_or_else(|| QuizError::UnknownGroup(name.clone()))?;
                resolve_members(self.bank.questions(), group)
            }
        };

        if working_set.is_empty() {
            log::debug!("group {} matched no questions", self.group);
            self.stage = Stage::Empty;
            return Err(QuizError::EmptyWorkingSet {
                group: self.group.name().to_string(),
            });
        }

        if self.random_order {
            working_set.shuffle(&mut self.rng);
        }

        log::debug!(
            "starting quiz: group={} random={} questions={}",
            self.group,
            self.random_order,
            working_set.len()
        );
        self.stage = Stage::Running(QuizRun {
            working_set,
            page_size: self.settings.page_size(),
            page_index: 0,
            selections: HashMap::new(),
            page_results: BTreeMap::new(),
        });
        Ok(QuizPhase::Active)
    }

    /// Drop any run and go back to the selection screen, keeping the draft.
    pub fn return_to_selection(&mut self) {
        self.stage = Stage::Selecting;
    }

    // ─── Quiz screen ──────────────────────────────────────────────────────────

    /// Record (or replace) the answer for a question on the current page.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` without a run, and `QuizError::Precondition`
    /// if the page is checked, the question is elsewhere, or the option is unknown.
    pub fn select_option(&mut self, id: QuestionId, option: &str) -> Result<(), QuizError> {
        let run = self.run_mut()?;
        if run.is_checked() {
            return Err(reject(PreconditionError::PageLocked {
                page: run.page_index,
            }));
        }
        let Some(question) = run.page().iter().find(|q| q.id() == id) else {
            return Err(reject(PreconditionError::QuestionNotOnPage { id }));
        };
        if !question.has_option(option) {
            return Err(reject(PreconditionError::UnknownOption {
                id,
                option: option.to_string(),
            }));
        }

        run.selections.insert(id, option.to_string());
        Ok(())
    }

    /// Lock the current page and score it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Precondition` with the unanswered ids if any question on
    /// the page lacks a selection, or if the page was already checked.
    pub fn check_page(&mut self) -> Result<PageResult, QuizError> {
        let run = self.run_mut()?;
        if run.is_checked() {
            return Err(reject(PreconditionError::PageLocked {
                page: run.page_index,
            }));
        }
        let missing = run.missing();
        if !missing.is_empty() {
            return Err(reject(PreconditionError::Unanswered { missing }));
        }

        let result = run.score_page();
        run.page_results.insert(run.page_index, result);
        log::debug!(
            "checked page {}: {} correct, {} wrong",
            run.page_index,
            result.correct,
            result.wrong
        );
        Ok(result)
    }

    /// Advance to the next page.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Precondition` if the current page is unchecked or last.
    pub fn next_page(&mut self) -> Result<(), QuizError> {
        let run = self.run_mut()?;
        if !run.is_checked() {
            return Err(reject(PreconditionError::PageNotChecked {
                page: run.page_index,
            }));
        }
        if run.is_last_page() {
            return Err(reject(PreconditionError::NoNextPage {
                page: run.page_index,
            }));
        }
        run.page_index += 1;
        Ok(())
    }

    // ─── Derived queries ──────────────────────────────────────────────────────

    /// Questions of the running quiz, in play order. Empty outside a run.
    #[must_use]
    pub fn working_set(&self) -> &[Question] {
        match self.run() {
            Some(run) => &run.working_set,
            None => &[],
        }
    }

    #[must_use]
    pub fn page_index(&self) -> Option<usize> {
        self.run().map(|run| run.page_index)
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.run().map_or(0, QuizRun::total_pages)
    }

    #[must_use]
    pub fn current_page_questions(&self) -> &[Question] {
        match self.run() {
            Some(run) => run.page(),
            None => &[],
        }
    }

    #[must_use]
    pub fn selection(&self, id: QuestionId) -> Option<&str> {
        self.run()?.selections.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn page_result(&self, page: usize) -> Option<PageResult> {
        self.run()?.page_results.get(&page).copied()
    }

    #[must_use]
    pub fn is_page_checked(&self) -> bool {
        self.run().is_some_and(QuizRun::is_checked)
    }

    /// True when the current page is unchecked and fully answered.
    #[must_use]
    pub fn can_check(&self) -> bool {
        self.run()
            .is_some_and(|run| !run.is_checked() && run.missing().is_empty())
    }

    /// True when the current page is checked and another page follows.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.run()
            .is_some_and(|run| run.is_checked() && !run.is_last_page())
    }

    /// Sum of every checked page's counts.
    #[must_use]
    pub fn aggregate_totals(&self) -> PageResult {
        self.run()
            .map(|run| run.page_results.values().sum::<PageResult>())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress::new(
            self.aggregate_totals(),
            self.working_set().len(),
            self.phase() == QuizPhase::Finished,
        )
    }

    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        self.progress().percent
    }

    fn run(&self) -> Option<&QuizRun> {
        match &self.stage {
            Stage::Running(run) => Some(run),
            _ => None,
        }
    }

    fn run_mut(&mut self) -> Result<&mut QuizRun, QuizError> {
        let phase = self.phase();
        match &mut self.stage {
            Stage::Running(run) => Ok(run),
            _ => Err(QuizError::NotActive { phase }),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.run();
        f.debug_struct("QuizSession")
            .field("phase", &self.phase())
            .field("group", &self.group)
            .field("random_order", &self.random_order)
            .field("page_size", &self.settings.page_size())
            .field("working_set_len", &run.map(|r| r.working_set.len()))
            .field("page_index", &run.map(|r| r.page_index))
            .field("checked_pages", &run.map(|r| r.page_results.len()))
            .finish_non_exhaustive()
    }
}

fn reject(err: PreconditionError) -> QuizError {
    log::warn!("rejected quiz action: {err}");
    QuizError::Precondition(err)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{Group, IdRange};

    fn question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            format!("right{id}"),
            vec![format!("wrong{id}"), format!("right{id}")],
        )
        .unwrap()
    }

    fn bank(count: u64, groups: Vec<Group>) -> Arc<QuestionBank> {
        Arc::new(QuestionBank::new((1..=count).map(question).collect(), groups))
    }

    fn session(count: u64) -> QuizSession {
        QuizSession::new(bank(count, Vec::new()), QuizSettings::default()).with_seed(42)
    }

    fn answer_page(session: &mut QuizSession, correct: usize) {
        let ids: Vec<_> = session
            .current_page_questions()
            .iter()
            .map(Question::id)
            .collect();
        for (i, id) in ids.into_iter().enumerate() {
            let option = if i < correct {
                format!("right{id}")
            } else {
                format!("wrong{id}")
            };
            session.select_option(id, &option).unwrap();
        }
    }

    fn ids(questions: &[Question]) -> Vec<u64> {
        questions.iter().map(|q| q.id().value()).collect()
    }

    #[test]
    fn starts_in_selecting_with_all_group() {
        let session = session(3);
        assert_eq!(session.phase(), QuizPhase::Selecting);
        assert_eq!(session.selected_group(), &GroupSelection::All);
        assert_eq!(session.total_pages(), 0);
        assert!(session.current_page_questions().is_empty());
    }

    #[test]
    fn start_pages_the_working_set() {
        let mut session = session(25);
        assert_eq!(session.start().unwrap(), QuizPhase::Active);

        assert_eq!(session.total_pages(), 3);
        assert_eq!(session.page_index(), Some(0));
        assert_eq!(ids(session.current_page_questions()), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn current_page_is_stable_across_reads() {
        let mut session = session(12);
        session.set_random_order(true);
        session.start().unwrap();

        let first = ids(session.current_page_questions());
        let second = ids(session.current_page_questions());
        assert_eq!(first, second);
        let options = session.current_page_questions()[0].options().to_vec();
        assert_eq!(session.current_page_questions()[0].options(), options.as_slice());
    }

    #[test]
    fn check_page_scores_seven_and_three() {
        let mut session = session(20);
        session.start().unwrap();
        answer_page(&mut session, 7);

        let result = session.check_page().unwrap();
        assert_eq!(result, PageResult { correct: 7, wrong: 3 });
        assert_eq!(session.page_result(0), Some(result));
        assert_eq!(session.phase(), QuizPhase::Active);
    }

    #[test]
    fn totals_sum_checked_pages() {
        let mut session = session(20);
        session.start().unwrap();
        answer_page(&mut session, 7);
        session.check_page().unwrap();
        session.next_page().unwrap();
        answer_page(&mut session, 4);
        session.check_page().unwrap();

        assert_eq!(
            session.aggregate_totals(),
            PageResult { correct: 11, wrong: 9 }
        );
        assert_eq!(session.progress_percent(), 100);
        assert_eq!(session.phase(), QuizPhase::Finished);
    }

    #[test]
    fn check_with_unanswered_question_is_rejected() {
        let mut session = session(3);
        session.start().unwrap();
        session.select_option(QuestionId::new(1), "right1").unwrap();

        let err = session.check_page().unwrap_err();
        assert_eq!(
            err,
            QuizError::Precondition(PreconditionError::Unanswered {
                missing: vec![QuestionId::new(2), QuestionId::new(3)],
            })
        );
        assert_eq!(session.page_result(0), None);
        assert!(!session.is_page_checked());
        assert_eq!(session.aggregate_totals(), PageResult::default());
    }

    #[test]
    fn checked_page_is_locked() {
        let mut session = session(2);
        session.start().unwrap();
        answer_page(&mut session, 1);
        let result = session.check_page().unwrap();

        let err = session
            .select_option(QuestionId::new(2), "right2")
            .unwrap_err();
        assert!(matches!(
            err,
            QuizError::Precondition(PreconditionError::PageLocked { page: 0 })
        ));
        assert_eq!(session.selection(QuestionId::new(2)), Some("wrong2"));
        assert!(session.check_page().is_err());
        assert_eq!(session.page_result(0), Some(result));
    }

    #[test]
    fn selection_can_change_before_check() {
        let mut session = session(1);
        session.start().unwrap();
        session.select_option(QuestionId::new(1), "wrong1").unwrap();
        session.select_option(QuestionId::new(1), "right1").unwrap();

        assert_eq!(session.selection(QuestionId::new(1)), Some("right1"));
        assert_eq!(session.check_page().unwrap(), PageResult { correct: 1, wrong: 0 });
    }

    #[test]
    fn select_rejects_foreign_questions_and_options() {
        let mut session = session(15);
        session.start().unwrap();

        assert!(matches!(
            session.select_option(QuestionId::new(12), "right12"),
            Err(QuizError::Precondition(PreconditionError::QuestionNotOnPage { .. }))
        ));
        assert!(matches!(
            session.select_option(QuestionId::new(1), "maybe"),
            Err(QuizError::Precondition(PreconditionError::UnknownOption { .. }))
        ));
        assert_eq!(session.selection(QuestionId::new(1)), None);
    }

    #[test]
    fn next_page_requires_check_and_a_following_page() {
        let mut session = session(11);
        session.start().unwrap();

        assert!(matches!(
            session.next_page(),
            Err(QuizError::Precondition(PreconditionError::PageNotChecked { page: 0 }))
        ));

        answer_page(&mut session, 10);
        session.check_page().unwrap();
        assert!(session.can_advance());
        session.next_page().unwrap();
        assert_eq!(ids(session.current_page_questions()), vec![11]);

        answer_page(&mut session, 0);
        session.check_page().unwrap();
        assert_eq!(session.phase(), QuizPhase::Finished);
        assert!(matches!(
            session.next_page(),
            Err(QuizError::Precondition(PreconditionError::NoNextPage { page: 1 }))
        ));
    }

    #[test]
    fn actions_outside_a_run_are_not_active() {
        let mut session = session(2);
        assert_eq!(
            session.check_page(),
            Err(QuizError::NotActive {
                phase: QuizPhase::Selecting
            })
        );
        assert!(session.select_option(QuestionId::new(1), "right1").is_err());
        assert!(session.next_page().is_err());
    }

    #[test]
    fn group_filter_keeps_source_order() {
        let groups = vec![Group::new(
            "Tail",
            vec![IdRange::new(4, 6).unwrap(), IdRange::single(2)],
        )];
        let mut session = QuizSession::new(bank(8, groups), QuizSettings::default());
        session.set_group_name("Tail").unwrap();
        session.start().unwrap();

        assert_eq!(ids(session.working_set()), vec![2, 4, 5, 6]);
    }

    #[test]
    fn group_without_members_is_empty_not_finished() {
        let groups = vec![Group::new("Far", vec![IdRange::new(500, 600).unwrap()])];
        let mut session = QuizSession::new(bank(5, groups), QuizSettings::default());
        session.set_group_name("Far").unwrap();

        let err = session.start().unwrap_err();
        assert_eq!(
            err,
            QuizError::EmptyWorkingSet {
                group: "Far".into()
            }
        );
        assert_eq!(session.phase(), QuizPhase::Empty);
        assert_ne!(session.phase(), QuizPhase::Finished);
        assert!(session.check_page().is_err());
    }

    #[test]
    fn unknown_group_is_rejected() {
        let mut session = session(3);
        assert_eq!(
            session.set_group_name("Nope"),
            Err(QuizError::UnknownGroup("Nope".into()))
        );
        assert_eq!(session.selected_group(), &GroupSelection::All);
    }

    #[test]
    fn toggling_order_does_not_touch_running_quiz() {
        let mut session = session(30);
        session.start().unwrap();
        answer_page(&mut session, 5);
        let before = ids(session.working_set());

        session.set_random_order(true);

        assert_eq!(ids(session.working_set()), before);
        assert_eq!(session.selection(QuestionId::new(1)), Some("right1"));
        assert_eq!(session.phase(), QuizPhase::Active);
    }

    #[test]
    fn restart_resets_paging_and_answers() {
        let mut session = session(20);
        session.start().unwrap();
        answer_page(&mut session, 10);
        session.check_page().unwrap();
        session.next_page().unwrap();

        session.set_random_order(true);
        session.start().unwrap();

        assert_eq!(session.page_index(), Some(0));
        assert_eq!(session.aggregate_totals(), PageResult::default());
        assert!(session.working_set().iter().all(|q| session.selection(q.id()).is_none()));
        let mut shuffled = ids(session.working_set());
        shuffled.sort_unstable();
        assert_eq!(shuffled, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn random_order_is_a_permutation() {
        let mut session = session(40);
        session.set_random_order(true);
        session.start().unwrap();

        let order = ids(session.working_set());
        assert_ne!(order, (1..=40).collect::<Vec<_>>());
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=40).collect::<Vec<_>>());
    }

    #[test]
    fn return_to_selection_keeps_draft() {
        let groups = vec![Group::new("Head", vec![IdRange::new(1, 2).unwrap()])];
        let mut session = QuizSession::new(bank(4, groups), QuizSettings::default());
        session.set_group_name("Head").unwrap();
        session.set_random_order(true);
        session.start().unwrap();

        session.return_to_selection();

        assert_eq!(session.phase(), QuizPhase::Selecting);
        assert_eq!(session.selected_group().name(), "Head");
        assert!(session.random_order());
        assert!(session.working_set().is_empty());
        assert_eq!(session.available_groups(), vec!["ALL", "Head"]);
    }

    #[test]
    fn progress_tracks_answered_share() {
        let mut session =
            QuizSession::new(bank(8, Vec::new()), QuizSettings::new(3).unwrap()).with_seed(1);
        session.start().unwrap();
        assert_eq!(session.total_pages(), 3);
        answer_page(&mut session, 2);
        session.check_page().unwrap();

        let progress = session.progress();
        assert_eq!(progress.answered, 3);
        assert_eq!(progress.total, 8);
        assert_eq!(progress.percent, 38); // 37.5
        assert!(!progress.is_complete);
    }
}
