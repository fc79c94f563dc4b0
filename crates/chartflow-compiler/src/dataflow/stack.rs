//! Stack nodes

use crate::error::{CompileError, Result};
use chartflow_core::model::{ModelKind, ResolvedModel, SortOrder, StackOffset};
use chartflow_core::vega::SortSpec;
use chartflow_core::TransformStep;

/// Stacks one field within groups
#[derive(Debug, Clone, PartialEq)]
pub struct StackNode {
    pub groupby: Vec<String>,
    /// Stacked field
    pub field: String,
    /// Fields ordering the layers of a stack
    pub stack_by: Vec<String>,
    pub offset: StackOffset,
}

impl StackNode {
    /// Stacking of a unit model with resolved stack properties
    pub fn from_model(model: &ResolvedModel) -> Result<Option<Self>> {
        let ModelKind::Unit {
            stack: Some(properties),
            ..
        } = &model.kind
        else {
            return Ok(None);
        };

        let output_of = |channel: chartflow_core::Channel| {
            model
                .channel(channel)
                .and_then(|f| f.output_name())
                .ok_or_else(|| {
                    CompileError::SemanticError(format!(
                        "stack of model '{}' reads unencoded channel '{}'",
                        model.name, channel
                    ))
                })
        };

        let field = output_of(properties.field_channel)?;
        let groupby = match properties.groupby_channel {
            Some(channel) => vec![output_of(channel)?],
            None => Vec::new(),
        };
        let stack_by = properties
            .stack_by
            .iter()
            .map(|&channel| output_of(channel))
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Self {
            groupby,
            field,
            stack_by,
            offset: properties.offset,
        }))
    }

    /// Add group-by fields not already present
    pub fn add_dimensions(&mut self, fields: &[String]) {
        for field in fields {
            if !self.groupby.contains(field) {
                self.groupby.push(field.clone());
            }
        }
    }

    pub fn assemble(&self) -> TransformStep {
        TransformStep::Stack {
            groupby: self.groupby.clone(),
            field: self.field.clone(),
            sort: SortSpec {
                field: self.stack_by.clone(),
                order: vec![SortOrder::Descending.as_str().to_string(); self.stack_by.len()],
            },
            as_fields: [
                format!("{}_start", self.field),
                format!("{}_end", self.field),
            ],
            offset: self.offset.as_str().to_string(),
        }
    }
}
