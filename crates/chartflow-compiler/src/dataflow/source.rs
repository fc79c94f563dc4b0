//! Source nodes

use crate::error::Result;
use chartflow_core::model::DataSource;
use chartflow_core::{DatasetRecord, TransformStep};
use sha2::{Digest, Sha256};

/// Root of a dataflow tree: one distinct dataset
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    pub data: DataSource,
    hash: String,
}

impl SourceNode {
    /// Create a source, hashing the canonical JSON form of its declaration
    pub fn new(data: DataSource) -> Result<Self> {
        let bytes = serde_json::to_vec(&data)?;
        let hash = format!("{:x}", Sha256::digest(&bytes));
        Ok(Self { data, hash })
    }

    /// Content hash; equal declarations share one source
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub(crate) fn short_hash(&self) -> &str {
        &self.hash[..8]
    }

    /// Name bound at runtime, for named sources
    pub fn dataset_name(&self) -> Option<&str> {
        match &self.data {
            DataSource::Named { name } => Some(name),
            _ => None,
        }
    }

    /// The record that loads this dataset
    pub fn assemble(&self, name: &str) -> DatasetRecord {
        let mut record = DatasetRecord::named(name);
        match &self.data {
            DataSource::Values { values, format } => {
                record.values = Some(values.clone());
                record.format = format.clone();
            }
            DataSource::Url { url, format } => {
                record.url = Some(url.clone());
                record.format = format.clone();
            }
            DataSource::Sequence { sequence } => {
                record.transform.push(TransformStep::Sequence {
                    start: sequence.start,
                    stop: sequence.stop,
                    step: sequence.step,
                    as_field: sequence.as_field.clone(),
                });
            }
            DataSource::Named { .. } => {}
        }
        record
    }
}
