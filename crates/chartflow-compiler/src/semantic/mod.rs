//! Semantic analysis module
//!
//! Checks a resolved model tree for errors the dataflow builder cannot
//! recover from.

pub mod analyzer;

pub use analyzer::ModelAnalyzer;
