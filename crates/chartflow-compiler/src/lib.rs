//! Chartflow Compiler - resolved model to dataset records
//!
//! This crate builds the dataflow IR implied by a resolved model, rewrites it
//! to remove redundant work, and assembles it into named dataset records.

pub mod builder;
pub mod codegen;
pub mod compiler;
pub mod dataflow;
pub mod error;
pub mod optimizer;
pub mod semantic;

// Re-export main types
pub use compiler::{Compiler, CompilerOptions, FacetHoistPolicy};
pub use error::{CompileError, Result};

pub use builder::{DataComponent, DataflowBuilder};
pub use codegen::DatasetAssembler;
pub use dataflow::{DataflowGraph, NodeId, NodeKind, NodeTag};
pub use optimizer::{DataflowOptimizer, DeadNodeEliminator};
pub use semantic::ModelAnalyzer;
