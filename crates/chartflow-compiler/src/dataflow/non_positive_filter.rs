//! Non-positive filter nodes

use chartflow_core::model::{datum, ResolvedModel};
use chartflow_core::TransformStep;
use std::collections::BTreeMap;

/// Drops rows a log scale cannot place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NonPositiveFilterNode {
    /// Field -> whether its scale is logarithmic
    fields: BTreeMap<String, bool>,
}

impl NonPositiveFilterNode {
    pub fn from_model(model: &ResolvedModel) -> Option<Self> {
        let mut fields = BTreeMap::new();
        for (_, field_def) in model.field_defs() {
            if field_def.scale.is_none() {
                continue;
            }
            if let Some(output) = field_def.output_name() {
                let entry = fields.entry(output).or_insert(false);
                *entry = *entry || field_def.has_log_scale();
            }
        }

        if fields.is_empty() {
            None
        } else {
            Some(Self { fields })
        }
    }

    pub fn size(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn is_vacuous(&self) -> bool {
        self.fields.values().all(|log| !log)
    }

    pub fn merge(&mut self, other: NonPositiveFilterNode) {
        for (field, log) in other.fields {
            let entry = self.fields.entry(field).or_insert(false);
            *entry = *entry || log;
        }
    }

    pub fn assemble(&self) -> Vec<TransformStep> {
        self.fields
            .iter()
            .filter(|(_, log)| **log)
            .map(|(field, _)| TransformStep::filter(format!("{} > 0", datum(field))))
            .collect()
    }
}
