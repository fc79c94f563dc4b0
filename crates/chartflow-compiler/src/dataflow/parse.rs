//! Parse nodes

use chartflow_core::model::{FieldType, ResolvedModel, TransformSpec};
use std::collections::BTreeMap;

/// Load-time field type coercions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseNode {
    parse: BTreeMap<String, String>,
}

impl ParseNode {
    pub fn new(parse: BTreeMap<String, String>) -> Self {
        Self { parse }
    }

    /// Coercions implied by a model's field definitions.
    ///
    /// Quantitative fields parse as numbers and temporal fields as dates.
    /// Fields the model derives through `calculate` exist only after load and
    /// are skipped.
    pub fn from_model(model: &ResolvedModel) -> Option<Self> {
        let calculated: Vec<&str> = model
            .transform
            .iter()
            .filter_map(|t| match t {
                TransformSpec::Calculate { as_field, .. } => Some(as_field.as_str()),
                TransformSpec::Filter { .. } => None,
            })
            .collect();

        let mut parse = BTreeMap::new();
        for (_, field_def) in model.field_defs() {
            if field_def.is_count() {
                continue;
            }
            let Some(field) = field_def.field.as_deref() else {
                continue;
            };
            if calculated.contains(&field) {
                continue;
            }
            let target = match field_def.field_type {
                FieldType::Quantitative => "number",
                FieldType::Temporal => "date",
                FieldType::Ordinal | FieldType::Nominal => continue,
            };
            parse.entry(field.to_string()).or_insert_with(|| target.to_string());
        }

        if parse.is_empty() {
            None
        } else {
            Some(Self { parse })
        }
    }

    /// Union, keeping existing entries on conflict
    pub fn merge(&mut self, other: ParseNode) {
        for (field, target) in other.parse {
            self.parse.entry(field).or_insert(target);
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.parse.keys().map(String::as_str).collect()
    }

    /// Field -> parse type, as written into the source format
    pub fn assemble(&self) -> &BTreeMap<String, String> {
        &self.parse
    }
}
