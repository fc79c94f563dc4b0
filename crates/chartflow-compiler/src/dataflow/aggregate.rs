//! Aggregate nodes

use chartflow_core::model::{AggregateOp, BinSuffix, ResolvedModel};
use chartflow_core::TransformStep;

/// One aggregated measure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measure {
    /// Input field, `*` for count
    pub field: String,
    pub op: AggregateOp,
}

impl Measure {
    /// Output field name
    pub fn as_field(&self) -> String {
        format!("{}_{}", self.op.as_str(), self.field)
    }
}

/// Group-by aggregation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateNode {
    pub dimensions: Vec<String>,
    pub measures: Vec<Measure>,
}

impl AggregateNode {
    /// Aggregation of a unit model, or `None` when no channel aggregates.
    ///
    /// Non-aggregated fields become dimensions: binned fields contribute
    /// their start and end (and range label under a discrete scale).
    pub fn from_model(model: &ResolvedModel) -> Option<Self> {
        let field_defs = model.field_defs();
        if !field_defs.iter().any(|(_, f)| f.aggregate.is_some()) {
            return None;
        }

        let mut node = Self::default();
        for (_, field_def) in field_defs {
            if field_def.is_count() {
                node.add_measure("*", AggregateOp::Count);
            } else if let Some(op) = field_def.aggregate {
                if let Some(field) = field_def.field.as_deref() {
                    node.add_measure(field, op);
                }
            } else if field_def.bin_params().is_some() {
                let mut suffixes = vec![BinSuffix::Start, BinSuffix::End];
                if field_def.has_discrete_scale() {
                    suffixes.push(BinSuffix::Range);
                }
                let outputs: Vec<String> = suffixes
                    .into_iter()
                    .filter_map(|s| field_def.bin_output(s))
                    .collect();
                node.add_dimensions(&outputs);
            } else if let Some(output) = field_def.output_name() {
                node.add_dimensions(&[output]);
            }
        }
        Some(node)
    }

    fn add_measure(&mut self, field: &str, op: AggregateOp) {
        let measure = Measure {
            field: field.to_string(),
            op,
        };
        if !self.measures.contains(&measure) {
            self.measures.push(measure);
        }
    }

    /// Add group-by fields not already present
    pub fn add_dimensions(&mut self, fields: &[String]) {
        for field in fields {
            if !self.dimensions.contains(field) {
                self.dimensions.push(field.clone());
            }
        }
    }

    pub fn merge(&mut self, other: AggregateNode) {
        self.add_dimensions(&other.dimensions);
        for measure in other.measures {
            self.add_measure(&measure.field, measure.op);
        }
    }

    pub fn assemble(&self) -> TransformStep {
        TransformStep::Aggregate {
            groupby: self.dimensions.clone(),
            fields: self.measures.iter().map(|m| m.field.clone()).collect(),
            ops: self.measures.iter().map(|m| m.op.as_str().to_string()).collect(),
            as_fields: self.measures.iter().map(Measure::as_field).collect(),
        }
    }
}
