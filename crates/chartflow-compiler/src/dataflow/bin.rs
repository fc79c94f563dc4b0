//! Bin nodes

use crate::error::Result;
use chartflow_core::model::{datum, var_name, BinSuffix, ResolvedModel};
use chartflow_core::vega::BinExtent;
use chartflow_core::TransformStep;
use std::collections::BTreeMap;

/// Steps generated for one (parameters, field) binning
#[derive(Debug, Clone, PartialEq)]
pub struct BinEntry {
    /// Extent computation, absent when the parameters fix the extent
    pub extent: Option<TransformStep>,
    pub bin: TransformStep,
    /// `start - end` label, for channels with a discrete scale
    pub range: Option<TransformStep>,
}

impl BinEntry {
    fn steps(&self) -> impl Iterator<Item = &TransformStep> {
        self.extent.iter().chain(std::iter::once(&self.bin)).chain(self.range.iter())
    }
}

/// Binning of every channel of a model, keyed by bin key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinNode {
    bins: BTreeMap<String, BinEntry>,
}

impl BinNode {
    pub fn from_model(model: &ResolvedModel) -> Result<Option<Self>> {
        let mut bins: BTreeMap<String, BinEntry> = BTreeMap::new();

        for (_, field_def) in model.field_defs() {
            let Some(params) = field_def.bin_params() else {
                continue;
            };
            let (Some(field), Some(key)) = (field_def.field.as_deref(), field_def.bin_key()) else {
                continue;
            };
            params.validate()?;

            let start = format!("{}_start", key);
            let end = format!("{}_end", key);
            let range = if field_def.has_discrete_scale() {
                let format = field_def
                    .guide_format()
                    .unwrap_or(model.config.number_format.as_str());
                Some(TransformStep::formula(
                    format!(
                        "format({}, '{}') + ' - ' + format({}, '{}')",
                        datum(&start),
                        format,
                        datum(&end),
                        format
                    ),
                    field_def
                        .bin_output(BinSuffix::Range)
                        .unwrap_or_else(|| format!("{}_range", key)),
                ))
            } else {
                None
            };

            if let Some(entry) = bins.get_mut(&key) {
                if entry.range.is_none() {
                    entry.range = range;
                }
                continue;
            }

            let extent_signal = model.get_name(&format!("{}_extent", key));
            let (extent_step, extent) = match params.extent {
                Some(bounds) => (None, BinExtent::Range(bounds)),
                None => (
                    Some(TransformStep::Extent {
                        field: field.to_string(),
                        signal: extent_signal.clone(),
                    }),
                    BinExtent::Signal {
                        signal: extent_signal,
                    },
                ),
            };

            let bin = TransformStep::Bin {
                field: field.to_string(),
                as_fields: [start, end],
                signal: var_name(&model.get_name(&format!("{}_bins", key))),
                extent,
                maxbins: params.maxbins,
                step: params.step,
                minstep: params.minstep,
                nice: params.nice,
                base: params.base,
            };

            bins.insert(
                key,
                BinEntry {
                    extent: extent_step,
                    bin,
                    range,
                },
            );
        }

        Ok(if bins.is_empty() {
            None
        } else {
            Some(Self { bins })
        })
    }

    /// Number of distinct bin keys
    pub fn size(&self) -> usize {
        self.bins.len()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.bins.keys().map(String::as_str).collect()
    }

    /// Union of keys; a shared key keeps this node's steps and gains a range
    /// label if only the other node had one
    pub fn merge(&mut self, other: BinNode) {
        for (key, entry) in other.bins {
            match self.bins.get_mut(&key) {
                Some(existing) => {
                    if existing.range.is_none() {
                        existing.range = entry.range;
                    }
                }
                None => {
                    self.bins.insert(key, entry);
                }
            }
        }
    }

    pub fn assemble(&self) -> Vec<TransformStep> {
        self.bins
            .values()
            .flat_map(|entry| entry.steps().cloned())
            .collect()
    }
}
