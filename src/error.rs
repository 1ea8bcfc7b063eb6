//! Error types for progress table operations.
//!
//! Dropped samples (unknown names, zero values, foreign scopes) are not
//! errors; they are reported through [`crate::registry::IngestStats`].

use std::io;
use thiserror::Error;

/// Result type alias using [`TableError`].
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors that can occur while configuring, feeding or drawing the table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Writing to the output stream failed.
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Why the value is invalid.
        message: String,
    },

    /// Value kind column held something other than 0 or 1.
    #[error("invalid value kind {0}: expected 0 (cumulative) or 1 (gauge)")]
    InvalidKind(i64),

    /// A row of the text event stream could not be decoded.
    #[error("malformed event record at line {line}: {message}")]
    MalformedRecord {
        /// Line number in the input stream (1-indexed).
        line: usize,
        /// What was wrong with the row.
        message: String,
    },
}
