//! Model analyzer
//!
//! Walks a resolved model tree before any dataflow is built and reports the
//! first problem found.

use crate::error::{CompileError, Result};
use chartflow_core::model::{Channel, FieldDef, ModelKind, ResolvedModel, TransformSpec};
use chartflow_core::CoreError;
use std::collections::HashSet;

/// Semantic analyzer for resolved models
#[derive(Debug, Default)]
pub struct ModelAnalyzer {
    /// Model names seen in the current tree
    seen_names: HashSet<String>,
}

impl ModelAnalyzer {
    /// Create a new analyzer
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a model tree
    pub fn analyze(&mut self, model: &ResolvedModel) -> Result<()> {
        self.seen_names.clear();
        self.analyze_model(model, false)
    }

    fn analyze_model(&mut self, model: &ResolvedModel, inherits_data: bool) -> Result<()> {
        if !self.seen_names.insert(model.name.clone()) {
            return Err(CompileError::SemanticError(format!(
                "Duplicate model name '{}'",
                model.name
            )));
        }

        let has_data = inherits_data || model.data.is_some();

        match &model.kind {
            ModelKind::Unit { encoding, stack, .. } => {
                require_data(model, has_data)?;
                for (channel, field_def) in encoding {
                    analyze_field_def(*channel, field_def)?;
                }
                if let Some(stack) = stack {
                    let channels = std::iter::once(stack.field_channel)
                        .chain(stack.groupby_channel)
                        .chain(stack.stack_by.iter().copied());
                    for channel in channels {
                        if !encoding.contains_key(&channel) {
                            return Err(CompileError::SemanticError(format!(
                                "Model '{}' stacks on unencoded channel '{}'",
                                model.name,
                                channel.as_str()
                            )));
                        }
                    }
                }
            }
            ModelKind::Layer { children } => {
                if children.is_empty() {
                    return Err(CompileError::SemanticError(format!(
                        "Layer '{}' has no children",
                        model.name
                    )));
                }
            }
            ModelKind::Facet { facet, .. } => {
                require_data(model, has_data)?;
                let dimensions = facet.field_defs();
                if dimensions.is_empty() {
                    return Err(CompileError::SemanticError(format!(
                        "Facet '{}' needs a row or column",
                        model.name
                    )));
                }
                for (channel, field_def) in dimensions {
                    if field_def.field.is_none() {
                        return Err(CoreError::MissingField {
                            channel: channel.as_str().to_string(),
                            message: "facet fields partition the data".to_string(),
                        }
                        .into());
                    }
                }
            }
        }

        for transform in &model.transform {
            analyze_transform(model, transform)?;
        }

        for child in model.children() {
            self.analyze_model(child, has_data)?;
        }
        Ok(())
    }
}

fn require_data(model: &ResolvedModel, has_data: bool) -> Result<()> {
    if has_data {
        Ok(())
    } else {
        Err(CompileError::MissingDataSource {
            model: if model.name.is_empty() {
                "<root>".to_string()
            } else {
                model.name.clone()
            },
        })
    }
}

fn analyze_field_def(channel: Channel, field_def: &FieldDef) -> Result<()> {
    if field_def.field.is_none() {
        let reason = if field_def.bin.is_some() {
            Some("binning needs a field")
        } else if field_def.time_unit.is_some() {
            Some("a time unit needs a field")
        } else if field_def.aggregate.is_some() && !field_def.is_count() {
            Some("only count aggregates without a field")
        } else {
            None
        };
        if let Some(message) = reason {
            return Err(CoreError::MissingField {
                channel: channel.as_str().to_string(),
                message: message.to_string(),
            }
            .into());
        }
    }

    if let Some(params) = field_def.bin_params() {
        params.validate()?;
    }
    Ok(())
}

fn analyze_transform(model: &ResolvedModel, transform: &TransformSpec) -> Result<()> {
    match transform {
        TransformSpec::Filter { filter } => filter.validate()?,
        TransformSpec::Calculate {
            calculate,
            as_field,
        } => {
            if calculate.trim().is_empty() || as_field.trim().is_empty() {
                return Err(CompileError::SemanticError(format!(
                    "Model '{}' has a calculate transform without expression or output field",
                    model.name
                )));
            }
        }
    }
    Ok(())
}
