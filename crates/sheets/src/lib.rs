#![forbid(unsafe_code)]

pub mod csv_rows;
pub mod published;
pub mod source;

pub use csv_rows::{CsvDirectory, parse_csv};
pub use published::PublishedSheet;
pub use source::{InMemoryTables, SourceError, TableSource};
