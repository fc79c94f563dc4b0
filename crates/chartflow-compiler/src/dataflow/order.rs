//! Order nodes

use chartflow_core::model::{Channel, ModelKind, ResolvedModel, SortOrder};
use chartflow_core::vega::SortSpec;
use chartflow_core::TransformStep;

/// Sorts rows before they reach the marks
#[derive(Debug, Clone, PartialEq)]
pub struct OrderNode {
    pub sort: SortSpec,
}

impl OrderNode {
    /// Sort by the `order` channel, or by x for path marks without one
    pub fn from_model(model: &ResolvedModel) -> Option<Self> {
        let ModelKind::Unit { mark, encoding, .. } = &model.kind else {
            return None;
        };

        let (field_def, order) = match encoding.get(&Channel::Order) {
            Some(order_def) => (order_def, order_def.sort.unwrap_or_default()),
            None if mark.is_path() => (encoding.get(&Channel::X)?, SortOrder::Ascending),
            None => return None,
        };

        let field = field_def.output_name()?;
        Some(Self {
            sort: SortSpec {
                field: vec![field],
                order: vec![order.as_str().to_string()],
            },
        })
    }

    pub fn assemble(&self) -> TransformStep {
        TransformStep::Collect {
            sort: self.sort.clone(),
        }
    }
}
