//! Node kinds
//!
//! The closed set of dataflow node kinds. Merge, assembly and vacuity checks
//! dispatch over the tag so adding a kind forces every rule to consider it.

use super::aggregate::AggregateNode;
use super::bin::BinNode;
use super::facet::{FacetAggregateNode, FacetNode};
use super::non_positive_filter::NonPositiveFilterNode;
use super::null_filter::NullFilterNode;
use super::order::OrderNode;
use super::output::OutputNode;
use super::parse::ParseNode;
use super::source::SourceNode;
use super::stack::StackNode;
use super::time_unit::TimeUnitNode;
use super::transforms::{CalculateNode, FilterNode};
use crate::error::{CompileError, Result};
use chartflow_core::TransformStep;
use std::fmt;

/// Payload-free discriminant of a [`NodeKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Source,
    Parse,
    Filter,
    Calculate,
    NullFilter,
    Bin,
    TimeUnit,
    Output,
    Aggregate,
    Order,
    Stack,
    NonPositiveFilter,
    FacetAggregate,
    Facet,
}

impl NodeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeTag::Source => "source",
            NodeTag::Parse => "parse",
            NodeTag::Filter => "filter",
            NodeTag::Calculate => "calculate",
            NodeTag::NullFilter => "nullfilter",
            NodeTag::Bin => "bin",
            NodeTag::TimeUnit => "timeunit",
            NodeTag::Output => "output",
            NodeTag::Aggregate => "aggregate",
            NodeTag::Order => "order",
            NodeTag::Stack => "stack",
            NodeTag::NonPositiveFilter => "nonpositivefilter",
            NodeTag::FacetAggregate => "facetaggregate",
            NodeTag::Facet => "facet",
        }
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dataflow node and its payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Source(SourceNode),
    Parse(ParseNode),
    Filter(FilterNode),
    Calculate(CalculateNode),
    NullFilter(NullFilterNode),
    Bin(BinNode),
    TimeUnit(TimeUnitNode),
    Output(OutputNode),
    Aggregate(AggregateNode),
    Order(OrderNode),
    Stack(StackNode),
    NonPositiveFilter(NonPositiveFilterNode),
    FacetAggregate(FacetAggregateNode),
    Facet(FacetNode),
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Source(_) => NodeTag::Source,
            NodeKind::Parse(_) => NodeTag::Parse,
            NodeKind::Filter(_) => NodeTag::Filter,
            NodeKind::Calculate(_) => NodeTag::Calculate,
            NodeKind::NullFilter(_) => NodeTag::NullFilter,
            NodeKind::Bin(_) => NodeTag::Bin,
            NodeKind::TimeUnit(_) => NodeTag::TimeUnit,
            NodeKind::Output(_) => NodeTag::Output,
            NodeKind::Aggregate(_) => NodeTag::Aggregate,
            NodeKind::Order(_) => NodeTag::Order,
            NodeKind::Stack(_) => NodeTag::Stack,
            NodeKind::NonPositiveFilter(_) => NodeTag::NonPositiveFilter,
            NodeKind::FacetAggregate(_) => NodeTag::FacetAggregate,
            NodeKind::Facet(_) => NodeTag::Facet,
        }
    }

    /// Absorb the payload of a node of the same kind
    pub fn merge(&mut self, other: NodeKind) -> Result<()> {
        match (self, other) {
            (NodeKind::Parse(a), NodeKind::Parse(b)) => a.merge(b),
            (NodeKind::Filter(a), NodeKind::Filter(b)) => a.merge(b),
            (NodeKind::NullFilter(a), NodeKind::NullFilter(b)) => a.merge(b),
            (NodeKind::Bin(a), NodeKind::Bin(b)) => a.merge(b),
            (NodeKind::TimeUnit(a), NodeKind::TimeUnit(b)) => a.merge(b),
            (NodeKind::Aggregate(a), NodeKind::Aggregate(b)) => a.merge(b),
            (NodeKind::NonPositiveFilter(a), NodeKind::NonPositiveFilter(b)) => a.merge(b),
            (this, other) => {
                return Err(CompileError::InvalidGraphOperation(format!(
                    "cannot merge {} into {}",
                    other.tag(),
                    this.tag()
                )))
            }
        }
        Ok(())
    }

    /// Transform steps contributed to the enclosing dataset record.
    ///
    /// Checkpoint kinds and kinds that assemble into the record itself
    /// (source, parse) contribute nothing here.
    pub fn assemble(&self) -> Vec<TransformStep> {
        match self {
            NodeKind::Filter(node) => vec![node.assemble()],
            NodeKind::Calculate(node) => vec![node.assemble()],
            NodeKind::NullFilter(node) => node.assemble().into_iter().collect(),
            NodeKind::Bin(node) => node.assemble(),
            NodeKind::TimeUnit(node) => node.assemble(),
            NodeKind::Aggregate(node) => vec![node.assemble()],
            NodeKind::Order(node) => vec![node.assemble()],
            NodeKind::Stack(node) => vec![node.assemble()],
            NodeKind::NonPositiveFilter(node) => node.assemble(),
            NodeKind::Source(_)
            | NodeKind::Parse(_)
            | NodeKind::Output(_)
            | NodeKind::FacetAggregate(_)
            | NodeKind::Facet(_) => Vec::new(),
        }
    }

    /// Whether the node no longer does anything and can be removed
    pub fn is_vacuous(&self) -> bool {
        match self {
            NodeKind::NullFilter(node) => node.is_vacuous(),
            NodeKind::NonPositiveFilter(node) => node.is_vacuous(),
            NodeKind::Output(node) => !node.required,
            _ => false,
        }
    }

    /// Whether the node drops, groups or reorders rows
    pub fn changes_rows(&self) -> bool {
        matches!(
            self.tag(),
            NodeTag::Filter
                | NodeTag::NullFilter
                | NodeTag::Aggregate
                | NodeTag::Stack
                | NodeTag::NonPositiveFilter
                | NodeTag::FacetAggregate
        )
    }

    /// Short description for tree dumps
    pub fn label(&self) -> String {
        match self {
            NodeKind::Source(node) => format!("Source({})", node.short_hash()),
            NodeKind::Parse(node) => format!("Parse{:?}", node.fields()),
            NodeKind::Filter(node) => format!("Filter({})", node.predicates.len()),
            NodeKind::Calculate(node) => format!("Calculate({})", node.as_field),
            NodeKind::NullFilter(node) => format!("NullFilter{:?}", node.fields()),
            NodeKind::Bin(node) => format!("Bin{:?}", node.keys()),
            NodeKind::TimeUnit(node) => format!("TimeUnit{:?}", node.fields()),
            NodeKind::Output(node) => format!(
                "Output({}{})",
                node.name,
                if node.required { ", required" } else { "" }
            ),
            NodeKind::Aggregate(node) => format!("Aggregate{:?}", node.dimensions),
            NodeKind::Order(_) => "Order".to_string(),
            NodeKind::Stack(node) => format!("Stack({})", node.field),
            NodeKind::NonPositiveFilter(node) => format!("NonPositiveFilter{:?}", node.fields()),
            NodeKind::FacetAggregate(node) => format!("FacetAggregate({})", node.name),
            NodeKind::Facet(node) => format!("Facet({})", node.name),
        }
    }
}
