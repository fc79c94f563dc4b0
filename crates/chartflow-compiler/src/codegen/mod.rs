//! Code generation module
//!
//! Turns an optimized dataflow graph into dataset records.

pub mod dataset_codegen;

pub use dataset_codegen::DatasetAssembler;
