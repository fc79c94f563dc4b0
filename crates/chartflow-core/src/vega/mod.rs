//! Renderable dataset schema
//!
//! The compiler's output: an ordered list of named dataset records, each
//! optionally deriving from an upstream record and carrying the transform
//! steps the rendering engine runs.

pub mod dataset;
pub mod transform;

pub use dataset::{CompiledData, DatasetRecord, FacetData};
pub use transform::{BinExtent, SortSpec, TransformStep};
