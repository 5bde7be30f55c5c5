use async_trait::async_trait;
use csv::ReaderBuilder;
use quiz_core::Row;
use std::path::PathBuf;

use crate::source::{SourceError, TableSource};

/// Parse headerless CSV into rows. Record lengths may differ from row to row.
///
/// # Errors
///
/// Returns `SourceError::Csv` on malformed quoting or invalid UTF-8.
pub fn parse_csv(data: &[u8]) -> Result<Vec<Row>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Reads `<dir>/<table>.csv` for each requested table.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }
}

#[async_trait]
impl TableSource for CsvDirectory {
    async fn fetch(&self, table: &str) -> Result<Vec<Row>, SourceError> {
        let path = self.table_path(table);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(table.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let rows = parse_csv(&data)?;
        log::debug!("read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }
}
