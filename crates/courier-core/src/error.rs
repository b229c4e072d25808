//! Error types for courier-core

use thiserror::Error;

/// Core error type
///
/// Message dispatch itself never fails; these cover the host-facing
/// surfaces around it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Invalid output definition: {0}")]
    InvalidOutput(String),

    #[error("Save data error: {0}")]
    SaveData(#[from] bincode::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
