//! Transform steps

use serde::{Deserialize, Serialize};

/// Extent of a bin step: a signal computed by an extent step, or fixed bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinExtent {
    Signal { signal: String },
    Range([f64; 2]),
}

/// Sort fields and directions of a collect or stack step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: Vec<String>,
    pub order: Vec<String>,
}

impl SortSpec {
    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }
}

/// One step of a dataset's transform list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransformStep {
    Filter {
        expr: String,
    },
    Formula {
        expr: String,
        #[serde(rename = "as")]
        as_field: String,
    },
    Extent {
        field: String,
        signal: String,
    },
    Bin {
        field: String,
        #[serde(rename = "as")]
        as_fields: [String; 2],
        signal: String,
        extent: BinExtent,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maxbins: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minstep: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nice: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<f64>,
    },
    Aggregate {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        groupby: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ops: Vec<String>,
        #[serde(rename = "as", default, skip_serializing_if = "Vec::is_empty")]
        as_fields: Vec<String>,
    },
    Stack {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        groupby: Vec<String>,
        field: String,
        #[serde(default, skip_serializing_if = "SortSpec::is_empty")]
        sort: SortSpec,
        #[serde(rename = "as")]
        as_fields: [String; 2],
        offset: String,
    },
    Collect {
        sort: SortSpec,
    },
    Sequence {
        start: f64,
        stop: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
        #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
        as_field: Option<String>,
    },
}

impl TransformStep {
    pub fn filter(expr: impl Into<String>) -> Self {
        TransformStep::Filter { expr: expr.into() }
    }

    pub fn formula(expr: impl Into<String>, as_field: impl Into<String>) -> Self {
        TransformStep::Formula {
            expr: expr.into(),
            as_field: as_field.into(),
        }
    }

    /// Step type as serialized
    pub fn kind(&self) -> &'static str {
        match self {
            TransformStep::Filter { .. } => "filter",
            TransformStep::Formula { .. } => "formula",
            TransformStep::Extent { .. } => "extent",
            TransformStep::Bin { .. } => "bin",
            TransformStep::Aggregate { .. } => "aggregate",
            TransformStep::Stack { .. } => "stack",
            TransformStep::Collect { .. } => "collect",
            TransformStep::Sequence { .. } => "sequence",
        }
    }
}
