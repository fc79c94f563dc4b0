//! Error types for Chartflow Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Field definition on channel '{channel}' has no field: {message}")]
    MissingField { channel: String, message: String },

    #[error("Invalid bin parameters: {0}")]
    InvalidBin(String),

    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
