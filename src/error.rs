//! Failure taxonomy shared by the reader, mapper, appender and stores.
//!
//! Every variant renders as a single human-readable message. Nothing here is
//! retried: the CLI reports the message and exits.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("{}", table_not_found_message(.name, .available))]
    TableNotFound { name: String, available: Vec<String> },
    #[error("Invalid row index: {row}. Must be between 2 and {last_row}")]
    OutOfRange { row: usize, last_row: usize },
    #[error("No row is currently selected; pass --row or run `select` first")]
    NoSelection,
    #[error("Write to table '{table}' was rejected: {source}")]
    UpstreamWriteFailure {
        table: String,
        #[source]
        source: io::Error,
    },
    #[error("Reading table '{table}' failed: {source}")]
    UpstreamReadFailure {
        table: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),
}

pub type Result<T> = std::result::Result<T, IntakeError>;

impl IntakeError {
    pub fn write_failure(table: &str, source: impl Into<io::Error>) -> Self {
        IntakeError::UpstreamWriteFailure {
            table: table.to_string(),
            source: source.into(),
        }
    }

    pub fn read_failure(table: &str, source: impl Into<io::Error>) -> Self {
        IntakeError::UpstreamReadFailure {
            table: table.to_string(),
            source: source.into(),
        }
    }
}

fn table_not_found_message(name: &str, available: &[String]) -> String {
    if available.is_empty() {
        format!("Table '{name}' not found and the store holds no tables")
    } else {
        format!(
            "Table '{name}' not found (available: {})",
            available.join(", ")
        )
    }
}
