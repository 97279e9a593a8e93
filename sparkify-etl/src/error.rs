//! Error types for sparkify-etl
//!
//! Extraction failures ([`ParseError`]) abort the run: a malformed record is a
//! data defect, not something to skip. Load failures ([`LoadError`]) are scoped
//! to one table batch and are collected in the pipeline report instead.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed input discovered while reading or extracting records
#[derive(Debug, Error)]
pub enum ParseError {
    /// A line of a source file is not valid JSON
    #[error("Malformed JSON at {}:{line}: {source}", .path.display())]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A line parsed as JSON but is not an object
    #[error("Expected a JSON object at {}:{line}", .path.display())]
    NotAnObject { path: PathBuf, line: usize },

    /// A record is missing a required field or a field has the wrong type
    #[error("Invalid {kind} record #{index}: {source}")]
    Record {
        kind: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// `ts` cannot be represented as a UTC timestamp
    #[error("Malformed timestamp {millis} ms: {reason}")]
    Timestamp { millis: i64, reason: String },

    /// `userId` is all digits but does not fit the warehouse key type
    #[error("User id out of range: {0}")]
    UserId(String),
}

/// Failure of one table batch; the batch has been rolled back
#[derive(Debug, Error)]
#[error("Failed to load table '{table}'{}: {source}", row_suffix(.row))]
pub struct LoadError {
    /// Destination table
    pub table: &'static str,
    /// Index of the offending row within the batch (None for begin/commit failures)
    pub row: Option<usize>,
    #[source]
    pub source: sqlx::Error,
}

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {}", r)).unwrap_or_default()
}

impl LoadError {
    pub fn at_row(table: &'static str, row: usize, source: sqlx::Error) -> Self {
        Self {
            table,
            row: Some(row),
            source,
        }
    }

    pub fn batch(table: &'static str, source: sqlx::Error) -> Self {
        Self {
            table,
            row: None,
            source,
        }
    }
}

/// Top-level error for a pipeline run
#[derive(Debug, Error)]
pub enum EtlError {
    /// Malformed input; nothing downstream of it was loaded
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Failed to read a source file
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store query failed outside a load batch (resolver lookups)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for pipeline operations
pub type EtlResult<T> = Result<T, EtlError>;
