//! Chartflow Core - model and output types for the chartflow compiler
//!
//! This crate provides the types shared across the chartflow workspace:
//! - Resolved model definitions (channels, field definitions, data sources)
//! - Expression helpers for predicates, bins and time units
//! - The renderable dataset schema produced by compilation
//! - Error types

pub mod error;
pub mod model;
pub mod vega;

// Re-export commonly used types
pub use error::CoreError;
pub use model::{Channel, FieldDef, ResolvedModel};
pub use vega::{CompiledData, DatasetRecord, FacetData, TransformStep};
