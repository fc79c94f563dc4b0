//! Data source declarations

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Load format of a data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFormat {
    /// `json`, `csv`, `tsv`, ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub format_type: Option<String>,

    /// Field name -> parse type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse: Option<BTreeMap<String, String>>,
}

/// Where a model's data comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSource {
    /// Inline values
    Values {
        values: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<DataFormat>,
    },
    /// Remote or local file
    Url {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<DataFormat>,
    },
    /// Generated number sequence
    Sequence { sequence: SequenceParams },
    /// Dataset bound by name at runtime
    Named { name: String },
}

/// Parameters of a generated sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceParams {
    pub start: f64,
    pub stop: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_field: Option<String>,
}

impl DataSource {
    pub fn values(values: Vec<Value>) -> Self {
        DataSource::Values {
            values,
            format: None,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        DataSource::Url {
            url: url.into(),
            format: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        DataSource::Named { name: name.into() }
    }

    /// Declared load format, if any
    pub fn format(&self) -> Option<&DataFormat> {
        match self {
            DataSource::Values { format, .. } | DataSource::Url { format, .. } => format.as_ref(),
            DataSource::Sequence { .. } | DataSource::Named { .. } => None,
        }
    }
}
