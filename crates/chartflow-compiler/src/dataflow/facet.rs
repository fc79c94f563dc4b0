//! Facet nodes

use crate::error::{CompileError, Result};
use chartflow_core::model::{Channel, ModelKind, ResolvedModel};
use chartflow_core::TransformStep;

fn facet_field(model: &ResolvedModel, channel: Channel) -> Option<String> {
    match &model.kind {
        ModelKind::Facet { facet, .. } => {
            let field_def = match channel {
                Channel::Row => facet.row.as_ref(),
                Channel::Column => facet.column.as_ref(),
                _ => None,
            }?;
            field_def.output_name()
        }
        _ => None,
    }
}

/// Terminal output grouping the data by one facet dimension, used to lay
/// out the facet headers
#[derive(Debug, Clone, PartialEq)]
pub struct FacetAggregateNode {
    pub name: String,
    pub field: String,
    pub dimension: Channel,
    /// Record this output resolves to, set during assembly
    pub resolved: Option<String>,
}

impl FacetAggregateNode {
    /// Create the aggregate for `dimension` (row or column) of a facet model
    pub fn new(model: &ResolvedModel, dimension: Channel) -> Result<Self> {
        let field = facet_field(model, dimension).ok_or_else(|| {
            CompileError::MissingFacetDimension {
                model: model.name.clone(),
                dimension: dimension.to_string(),
            }
        })?;
        Ok(Self {
            name: model.get_name(dimension.as_str()),
            field,
            dimension,
            resolved: None,
        })
    }

    pub fn assemble(&self) -> TransformStep {
        TransformStep::Aggregate {
            groupby: vec![self.field.clone()],
            fields: Vec::new(),
            ops: Vec::new(),
            as_fields: Vec::new(),
        }
    }
}

/// Start of a per-partition subtree
#[derive(Debug, Clone, PartialEq)]
pub struct FacetNode {
    pub name: String,
    /// Partitioning fields, column before row
    pub groupby: Vec<String>,
    /// Record the partitions are cut from, set during assembly
    pub source: Option<String>,
}

impl FacetNode {
    pub fn from_model(model: &ResolvedModel) -> Option<Self> {
        if !matches!(model.kind, ModelKind::Facet { .. }) {
            return None;
        }
        let groupby: Vec<String> = [Channel::Column, Channel::Row]
            .into_iter()
            .filter_map(|channel| facet_field(model, channel))
            .collect();
        Some(Self {
            name: model.get_name("facet"),
            groupby,
            source: None,
        })
    }
}
