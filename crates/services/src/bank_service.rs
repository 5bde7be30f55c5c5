use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

use quiz_core::{QuestionBank, Row};
use sheets::TableSource;

use crate::error::LoadError;

pub const DEFAULT_QUESTIONS_TABLE: &str = "questions";
pub const DEFAULT_GROUPS_TABLE: &str = "groups";

/// Fetches the question and group tables and turns them into a `QuestionBank`.
///
/// Both tables are requested concurrently; the bank is only built once both have
/// arrived, so a session can never observe a half-loaded state.
#[derive(Clone)]
pub struct BankLoader {
    source: Arc<dyn TableSource>,
    questions_table: String,
    groups_table: Option<String>,
}

impl BankLoader {
    #[must_use]
    pub fn new(source: Arc<dyn TableSource>) -> Self {
        Self {
            source,
            questions_table: DEFAULT_QUESTIONS_TABLE.to_string(),
            groups_table: Some(DEFAULT_GROUPS_TABLE.to_string()),
        }
    }

    #[must_use]
    pub fn with_questions_table(mut self, table: impl Into<String>) -> Self {
        self.questions_table = table.into();
        self
    }

    /// `None` loads no groups; only the all-questions selection is then offered.
    #[must_use]
    pub fn with_groups_table(mut self, table: Option<String>) -> Self {
        self.groups_table = table;
        self
    }

    #[must_use]
    pub fn questions_table(&self) -> &str {
        &self.questions_table
    }

    #[must_use]
    pub fn groups_table(&self) -> Option<&str> {
        self.groups_table.as_deref()
    }

    /// Load the bank, shuffling options with a freshly seeded generator.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Fetch` naming the table whose fetch failed.
    pub async fn load(&self) -> Result<QuestionBank, LoadError> {
        let (question_rows, group_rows) = self.fetch_rows().await?;
        let mut rng = StdRng::from_rng(&mut rand::rng());
        Ok(build(&question_rows, &group_rows, &mut rng))
    }

    /// Load the bank with a deterministic option shuffle.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Fetch` naming the table whose fetch failed.
    pub async fn load_seeded(&self, seed: u64) -> Result<QuestionBank, LoadError> {
        let (question_rows, group_rows) = self.fetch_rows().await?;
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(build(&question_rows, &group_rows, &mut rng))
    }

    async fn fetch_rows(&self) -> Result<(Vec<Row>, Vec<Row>), LoadError> {
        let questions = fetch_table(self.source.as_ref(), &self.questions_table);
        let groups = async {
            match &self.groups_table {
                Some(table) => fetch_table(self.source.as_ref(), table).await,
                None => Ok(Vec::new()),
            }
        };
        tokio::try_join!(questions, groups)
    }
}

async fn fetch_table(source: &dyn TableSource, table: &str) -> Result<Vec<Row>, LoadError> {
    source.fetch(table).await.map_err(|source| LoadError::Fetch {
        table: table.to_string(),
        source,
    })
}

fn build(question_rows: &[Row], group_rows: &[Row], rng: &mut StdRng) -> QuestionBank {
    let bank = QuestionBank::from_rows(question_rows, group_rows, rng);
    log::debug!(
        "loaded {} questions and {} groups",
        bank.questions().len(),
        bank.groups().len()
    );
    bank
}
