use async_trait::async_trait;
use quiz_core::Row;
use url::Url;

use crate::csv_rows::parse_csv;
use crate::source::{SourceError, TableSource};

const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d/";

/// A Google spreadsheet published to the web, read through its CSV export endpoint.
///
/// Each table name is a sheet (tab) name inside the spreadsheet.
#[derive(Clone)]
pub struct PublishedSheet {
    client: reqwest::Client,
    sheet_id: String,
    base: String,
}

impl PublishedSheet {
    #[must_use]
    pub fn new(sheet_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            sheet_id: sheet_id.into(),
            base: SHEETS_BASE.to_string(),
        }
    }

    /// Point requests at a different host, e.g. a local mirror.
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.base = base;
        self
    }

    /// CSV export URL for one sheet of the spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::InvalidUrl` if the base url or sheet id do not form a URL.
    pub fn table_url(&self, table: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base)?.join(&format!("{}/gviz/tq", self.sheet_id))?;
        url.query_pairs_mut()
            .append_pair("tqx", "out:csv")
            .append_pair("sheet", table);
        Ok(url)
    }
}

#[async_trait]
impl TableSource for PublishedSheet {
    async fn fetch(&self, table: &str) -> Result<Vec<Row>, SourceError> {
        let url = self.table_url(table)?;
        log::debug!("fetching sheet {table:?} from {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(table.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status));
        }

        let body = response.bytes().await?;
        parse_csv(&body)
    }
}
