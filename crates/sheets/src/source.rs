use async_trait::async_trait;
use quiz_core::Row;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by tabular data sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("table {0:?} not found")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid sheet url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("sheet request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Contract for anything that can hand over a named table as raw string rows.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Fetch every row of `table`, in source order.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NotFound` if the table does not exist, or transport errors.
    async fn fetch(&self, table: &str) -> Result<Vec<Row>, SourceError>;
}

/// Simple in-memory source for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryTables {
    tables: Arc<Mutex<HashMap<String, Vec<Row>>>>,
}

impl InMemoryTables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows of `table`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Connection` if the lock is poisoned.
    pub fn insert(&self, table: impl Into<String>, rows: Vec<Row>) -> Result<(), SourceError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|e| SourceError::Connection(e.to_string()))?;
        guard.insert(table.into(), rows);
        Ok(())
    }

    /// Builder-style variant of [`InMemoryTables::insert`] taking string slices.
    #[must_use]
    pub fn with_table(self, table: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect();
        if let Ok(mut guard) = self.tables.lock() {
            guard.insert(table.to_string(), rows);
        }
        self
    }
}

#[async_trait]
impl TableSource for InMemoryTables {
    async fn fetch(&self, table: &str) -> Result<Vec<Row>, SourceError> {
        let guard = self
            .tables
            .lock()
            .map_err(|e| SourceError::Connection(e.to_string()))?;
        guard
            .get(table)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(table.to_string()))
    }
}
