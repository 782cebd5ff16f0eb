//! Error types for the INTERBØX core library.

use thiserror::Error;

/// Result type alias using the core `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for INTERBØX operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed correlation ID
    #[error("Invalid correlation ID: {0}")]
    CorrelationId(String),

    /// Illegal status change on a record
    #[error("Cannot move {record} from '{from}' to '{to}'")]
    Transition {
        record: &'static str,
        from: String,
        to: String,
    },

    /// Unknown enum value in a request or stored row
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },
}
