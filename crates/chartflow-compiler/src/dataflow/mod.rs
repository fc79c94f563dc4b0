//! Dataflow IR
//!
//! A forest of transformation nodes rooted at data sources. Each resolved
//! model contributes one chain; the optimizer rewrites the forest in place
//! and the assembler linearizes it into dataset records.

pub mod aggregate;
pub mod bin;
pub mod facet;
pub mod graph;
pub mod node;
pub mod non_positive_filter;
pub mod null_filter;
pub mod order;
pub mod output;
pub mod parse;
pub mod source;
pub mod stack;
pub mod time_unit;
pub mod transforms;

pub use aggregate::{AggregateNode, Measure};
pub use bin::{BinEntry, BinNode};
pub use facet::{FacetAggregateNode, FacetNode};
pub use graph::{DataflowGraph, NodeId};
pub use node::{NodeKind, NodeTag};
pub use non_positive_filter::NonPositiveFilterNode;
pub use null_filter::NullFilterNode;
pub use order::OrderNode;
pub use output::OutputNode;
pub use parse::ParseNode;
pub use source::SourceNode;
pub use stack::StackNode;
pub use time_unit::TimeUnitNode;
pub use transforms::{CalculateNode, FilterNode};
