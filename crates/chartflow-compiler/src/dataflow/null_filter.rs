//! Null filter nodes

use chartflow_core::model::{datum, FieldType, ResolvedModel};
use chartflow_core::TransformStep;
use std::collections::BTreeMap;

/// Drops rows whose fields are null or NaN
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NullFilterNode {
    /// Field -> whether invalid values are dropped
    fields: BTreeMap<String, bool>,
}

impl NullFilterNode {
    pub fn new(fields: BTreeMap<String, bool>) -> Self {
        Self { fields }
    }

    /// One entry per field-bearing channel other than `count`.
    ///
    /// The model's `filter_invalid` setting decides every entry; left unset,
    /// only quantitative and temporal fields are filtered.
    pub fn from_model(model: &ResolvedModel) -> Option<Self> {
        let mut fields = BTreeMap::new();
        for (_, field_def) in model.field_defs() {
            if field_def.is_count() {
                continue;
            }
            let Some(field) = field_def.field.as_deref() else {
                continue;
            };
            let drop_invalid = model.config.filter_invalid.unwrap_or(matches!(
                field_def.field_type,
                FieldType::Quantitative | FieldType::Temporal
            ));
            let entry = fields.entry(field.to_string()).or_insert(false);
            *entry = *entry || drop_invalid;
        }

        if fields.is_empty() {
            None
        } else {
            Some(Self { fields })
        }
    }

    pub fn merge(&mut self, other: NullFilterNode) {
        for (field, drop_invalid) in other.fields {
            let entry = self.fields.entry(field).or_insert(false);
            *entry = *entry || drop_invalid;
        }
    }

    pub fn is_vacuous(&self) -> bool {
        self.fields.values().all(|d| !d)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn assemble(&self) -> Option<TransformStep> {
        let terms: Vec<String> = self
            .fields
            .iter()
            .filter(|(_, drop_invalid)| **drop_invalid)
            .map(|(field, _)| {
                let d = datum(field);
                format!("{} !== null && !isNaN({})", d, d)
            })
            .collect();

        if terms.is_empty() {
            None
        } else {
            Some(TransformStep::filter(terms.join(" && ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartflow_core::model::{Channel, FieldDef, Mark, ModelConfig};

    fn model() -> ResolvedModel {
        ResolvedModel::unit(Mark::Point)
            .encode(Channel::X, FieldDef::new("a", FieldType::Quantitative))
            .encode(Channel::Color, FieldDef::new("b", FieldType::Nominal))
            .encode(Channel::Y, FieldDef::count())
    }

    #[test]
    fn test_default_policy() {
        let node = NullFilterNode::from_model(&model()).unwrap();
        assert_eq!(node.fields(), vec!["a", "b"]);
        assert!(!node.is_vacuous());
        assert_eq!(
            node.assemble(),
            Some(TransformStep::filter(
                "datum[\"a\"] !== null && !isNaN(datum[\"a\"])"
            ))
        );
    }

    #[test]
    fn test_filter_invalid_disabled_is_vacuous() {
        let model = model().with_config(ModelConfig::default().with_filter_invalid(false));
        let node = NullFilterNode::from_model(&model).unwrap();
        assert!(node.is_vacuous());
        assert_eq!(node.assemble(), None);
    }

    #[test]
    fn test_merge_is_union() {
        let mut a = NullFilterNode::new(BTreeMap::from([("x".to_string(), false)]));
        a.merge(NullFilterNode::new(BTreeMap::from([
            ("x".to_string(), true),
            ("y".to_string(), true),
        ])));
        assert_eq!(
            a.assemble(),
            Some(TransformStep::filter(
                "datum[\"x\"] !== null && !isNaN(datum[\"x\"]) && datum[\"y\"] !== null && !isNaN(datum[\"y\"])"
            ))
        );
    }

    #[test]
    fn test_no_fields() {
        let model = ResolvedModel::unit(Mark::Point).encode(Channel::Y, FieldDef::count());
        assert!(NullFilterNode::from_model(&model).is_none());
    }
}
