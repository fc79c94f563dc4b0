//! Time unit nodes

use chartflow_core::model::ResolvedModel;
use chartflow_core::TransformStep;
use std::collections::BTreeMap;

/// Time truncation formulas keyed by output field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeUnitNode {
    formulas: BTreeMap<String, TransformStep>,
}

impl TimeUnitNode {
    pub fn from_model(model: &ResolvedModel) -> Option<Self> {
        let mut formulas = BTreeMap::new();
        for (_, field_def) in model.field_defs() {
            let (Some(unit), Some(field)) = (field_def.time_unit, field_def.field.as_deref()) else {
                continue;
            };
            let as_field = format!("{}_{}", unit.as_str(), field);
            formulas
                .entry(as_field.clone())
                .or_insert_with(|| TransformStep::formula(unit.field_expr(field), as_field));
        }

        if formulas.is_empty() {
            None
        } else {
            Some(Self { formulas })
        }
    }

    /// Number of distinct output fields
    pub fn size(&self) -> usize {
        self.formulas.len()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.formulas.keys().map(String::as_str).collect()
    }

    pub fn merge(&mut self, other: TimeUnitNode) {
        for (field, formula) in other.formulas {
            self.formulas.entry(field).or_insert(formula);
        }
    }

    pub fn assemble(&self) -> Vec<TransformStep> {
        self.formulas.values().cloned().collect()
    }
}
