//! Compiler error types

use chartflow_core::CoreError;
use thiserror::Error;

/// Compiler error
///
/// Every variant is fatal to the compilation that raised it.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A facet aggregate was requested for a dimension the model does not declare
    #[error("Model '{model}' has no {dimension} facet")]
    MissingFacetDimension { model: String, dimension: String },

    /// A parse node ended up anywhere but directly under a source
    #[error("Parse of [{fields}] can only be assembled directly under a source")]
    ParseNotUnderSource { fields: String },

    /// A facet aggregate node has descendants
    #[error("Facet aggregate '{name}' cannot have children (found {children})")]
    FacetAggregateHasChildren { name: String, children: usize },

    /// A model needs data but neither declares nor inherits any
    #[error("Model '{model}' has no data source")]
    MissingDataSource { model: String },

    /// A structural graph operation violated its precondition
    #[error("Invalid graph operation: {0}")]
    InvalidGraphOperation(String),

    /// Model validation failed
    #[error("Semantic error: {0}")]
    SemanticError(String),

    /// A hoisting pass kept rewriting the graph
    #[error("Optimizer pass '{pass}' did not converge after {iterations} iterations")]
    OptimizerDidNotConverge { pass: String, iterations: usize },

    /// Source content could not be serialized for hashing
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error raised by the core model types
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
