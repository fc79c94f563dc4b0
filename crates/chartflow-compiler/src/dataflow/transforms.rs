//! User transform nodes

use super::node::NodeKind;
use chartflow_core::model::predicate::conjunction;
use chartflow_core::model::{Predicate, ResolvedModel, TransformSpec};
use chartflow_core::TransformStep;

/// Conjunctive filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    pub predicates: Vec<Predicate>,
}

impl FilterNode {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    /// Append the other node's predicates after this node's own
    pub fn merge(&mut self, other: FilterNode) {
        self.predicates.extend(other.predicates);
    }

    pub fn assemble(&self) -> TransformStep {
        TransformStep::filter(conjunction(&self.predicates))
    }
}

/// Derived field formula
#[derive(Debug, Clone, PartialEq)]
pub struct CalculateNode {
    pub expr: String,
    pub as_field: String,
}

impl CalculateNode {
    pub fn new(expr: impl Into<String>, as_field: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            as_field: as_field.into(),
        }
    }

    pub fn assemble(&self) -> TransformStep {
        TransformStep::formula(self.expr.clone(), self.as_field.clone())
    }
}

/// Nodes for a model's transform list, in declaration order
pub fn transform_nodes(model: &ResolvedModel) -> Vec<NodeKind> {
    model
        .transform
        .iter()
        .map(|t| match t {
            TransformSpec::Filter { filter } => NodeKind::Filter(FilterNode::new(vec![filter.clone()])),
            TransformSpec::Calculate { calculate, as_field } => {
                NodeKind::Calculate(CalculateNode::new(calculate.clone(), as_field.clone()))
            }
        })
        .collect()
}
