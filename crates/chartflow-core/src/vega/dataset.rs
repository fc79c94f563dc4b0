//! Dataset records

use super::transform::TransformStep;
use crate::model::DataFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One named dataset of the renderable specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub name: String,

    /// Name of the upstream record this one derives from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DataFormat>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<TransformStep>,
}

impl DatasetRecord {
    /// Record with a name and nothing else
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Record deriving from `source` through `transform`
    pub fn derived(
        name: impl Into<String>,
        source: impl Into<String>,
        transform: Vec<TransformStep>,
    ) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
            transform,
            ..Default::default()
        }
    }

    /// Whether the record only renames its source
    pub fn is_reference(&self) -> bool {
        self.source.is_some() && self.transform.is_empty()
    }
}

/// Per-partition datasets of one facet boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetData {
    /// Generated name of the partitioned data
    pub name: String,

    /// Record the partitions are cut from
    pub source: String,

    /// Partitioning fields
    pub groupby: Vec<String>,

    /// Records derived inside one partition, rooted at `name`
    #[serde(default)]
    pub datasets: Vec<DatasetRecord>,
}

/// Result of compiling a model's data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledData {
    pub datasets: Vec<DatasetRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<FacetData>,
}

impl CompiledData {
    /// Look up a top-level record by name
    pub fn dataset(&self, name: &str) -> Option<&DatasetRecord> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Names of the top-level records, in output order
    pub fn dataset_names(&self) -> Vec<&str> {
        self.datasets.iter().map(|d| d.name.as_str()).collect()
    }

    /// Look up a facet by its generated name
    pub fn facet(&self, name: &str) -> Option<&FacetData> {
        self.facets.iter().find(|f| f.name == name)
    }
}
