//! Chartflow Parser - YAML / JSON loader for resolved models
//!
//! This crate reads resolved model trees produced by the upstream resolver,
//! either bare or wrapped in a versioned `model:` document.

pub mod error;
pub mod model_parser;

pub use error::{ParseError, Result};
pub use model_parser::{ModelDocument, ModelParser};
