//! Parser error types

use thiserror::Error;

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File could not be read
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// File extension not recognised
    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),

    /// Wrapped document without a model
    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
