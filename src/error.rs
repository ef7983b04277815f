//! Error types for fetching and parsing observation tables.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, DNS or non-2xx failure while talking to the endpoint.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The body has no usable header, or a row could not be read.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Schema mismatch on line {line}: expected {expected} fields, found {found}")]
    SchemaMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl From<csv::Error> for FetchError {
    fn from(err: csv::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
