use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use quiz_core::{QuestionId, Row};
use services::{
    BankLoader, GroupSelection, PageResult, PageView, QuizError, QuizPhase, QuizSession,
    QuizSettings,
};
use sheets::{InMemoryTables, SourceError, TableSource};

fn question_rows(count: u64) -> Vec<Row> {
    (1..=count)
        .map(|id| {
            vec![
                id.to_string(),
                format!("Question {id}?"),
                format!("right {id}"),
                format!("wrong {id}"),
                String::new(),
                format!("other {id}"),
            ]
        })
        .collect()
}

fn tables(count: u64) -> InMemoryTables {
    let tables = InMemoryTables::new().with_table(
        "groups",
        &[&["First half", "1-12"], &["Sparse", "3; 20-22, 99"], &["Nowhere", "500-600"]],
    );
    tables.insert("questions", question_rows(count)).unwrap();
    tables
}

fn answer_current_page(session: &mut QuizSession, correct: usize) {
    let ids: Vec<QuestionId> = session
        .current_page_questions()
        .iter()
        .map(|q| q.id())
        .collect();
    for (i, id) in ids.into_iter().enumerate() {
        let option = if i < correct {
            format!("right {id}")
        } else {
            format!("wrong {id}")
        };
        session.select_option(id, &option).unwrap();
    }
}

#[tokio::test]
async fn full_quiz_over_all_questions() {
    let bank = BankLoader::new(Arc::new(tables(25)))
        .load_seeded(3)
        .await
        .unwrap();
    assert!(bank.questions().iter().all(|q| q.options().len() == 3));

    let mut session = QuizSession::new(Arc::new(bank), QuizSettings::default()).with_seed(3);
    assert_eq!(
        session.available_groups(),
        vec!["ALL", "First half", "Sparse", "Nowhere"]
    );
    session.start().unwrap();
    assert_eq!(session.total_pages(), 3);

    let mut scores = Vec::new();
    loop {
        answer_current_page(&mut session, 4);
        scores.push(session.check_page().unwrap());
        if session.phase() == QuizPhase::Finished {
            break;
        }
        session.next_page().unwrap();
    }

    assert_eq!(
        scores,
        vec![
            PageResult { correct: 4, wrong: 6 },
            PageResult { correct: 4, wrong: 6 },
            PageResult { correct: 4, wrong: 1 },
        ]
    );
    let progress = session.progress();
    assert_eq!(progress.correct, 12);
    assert_eq!(progress.wrong, 13);
    assert_eq!(progress.percent, 100);
    assert!(progress.is_complete);
    assert!(PageView::from_session(&session).unwrap().finished);
}

#[tokio::test]
async fn group_selection_filters_and_empty_group_is_distinct() {
    let bank = BankLoader::new(Arc::new(tables(30))).load().await.unwrap();
    let mut session = QuizSession::new(Arc::new(bank), QuizSettings::default());

    session.set_group_name("Sparse").unwrap();
    session.start().unwrap();
    let ids: Vec<u64> = session.working_set().iter().map(|q| q.id().value()).collect();
    assert_eq!(ids, vec![3, 20, 21, 22]);
    assert_eq!(session.total_pages(), 1);

    session.return_to_selection();
    session.set_group(GroupSelection::Named("Nowhere".into())).unwrap();
    assert!(matches!(
        session.start(),
        Err(QuizError::EmptyWorkingSet { group }) if group == "Nowhere"
    ));
    assert_eq!(session.phase(), QuizPhase::Empty);
    assert_eq!(session.progress_percent(), 0);

    session.set_group_name("ALL").unwrap();
    session.start().unwrap();
    assert_eq!(session.working_set().len(), 30);
}

#[tokio::test]
async fn random_order_applies_only_on_next_start() {
    let bank = BankLoader::new(Arc::new(tables(30))).load().await.unwrap();
    let mut session = QuizSession::new(Arc::new(bank), QuizSettings::default()).with_seed(8);

    session.start().unwrap();
    let in_order: Vec<u64> = session.working_set().iter().map(|q| q.id().value()).collect();
    session.set_random_order(true);
    let still: Vec<u64> = session.working_set().iter().map(|q| q.id().value()).collect();
    assert_eq!(in_order, still);

    session.start().unwrap();
    let shuffled: Vec<u64> = session.working_set().iter().map(|q| q.id().value()).collect();
    assert_ne!(shuffled, in_order);
    assert_eq!(session.page_index(), Some(0));
}

struct CountingSource {
    inner: InMemoryTables,
    fetches: AtomicUsize,
}

#[async_trait]
impl TableSource for CountingSource {
    async fn fetch(&self, table: &str) -> Result<Vec<Row>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(table).await
    }
}

#[tokio::test]
async fn loader_fetches_each_table_once() {
    let source = Arc::new(CountingSource {
        inner: tables(5),
        fetches: AtomicUsize::new(0),
    });
    let loader = BankLoader::new(source.clone());

    let bank = loader.load().await.unwrap();

    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(bank.questions().len(), 5);
    assert_eq!(bank.groups().len(), 3);
}
