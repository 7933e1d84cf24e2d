//! Error types for the cnab_billing library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building remessa files or parsing
/// retorno files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A value does not satisfy a field or file constraint.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Required builder fields were never supplied.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A column range does not fit the record layout.
    #[error("Invalid column range {start}..={end}: {message}")]
    ColumnRange {
        start: usize,
        end: usize,
        message: String,
    },

    /// Unsupported bank code or unresolved reader implementation.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input content violates the expected CNAB layout.
    #[error("Format error: {0}")]
    Format(String),

    /// A field value is legal on its own but forbidden in this transaction.
    #[error("Domain rule violation: {0}")]
    DomainRule(String),

    /// Unknown code for a closed vocabulary.
    #[error("Unknown {vocabulary} code: {code}")]
    InvalidCode { vocabulary: &'static str, code: u32 },

    /// Invalid date format.
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid amount format.
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),
}
