//! Error types for courier-script

use thiserror::Error;

/// Level loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Conflicting definition: {0}")]
    ConflictingDefinition(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
