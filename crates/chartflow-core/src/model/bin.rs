//! Bin parameters

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Default maximum number of bins when binning is requested without parameters
pub const DEFAULT_MAXBINS: u32 = 10;

/// `bin` property of a field definition: a flag or explicit parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinSpec {
    Flag(bool),
    Params(BinParams),
}

impl BinSpec {
    /// Normalized parameters, or `None` when binning is switched off
    pub fn params(&self) -> Option<BinParams> {
        match self {
            BinSpec::Flag(false) => None,
            BinSpec::Flag(true) => Some(BinParams::default().normalized()),
            BinSpec::Params(params) => Some(params.clone().normalized()),
        }
    }
}

/// Explicit bin parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinParams {
    /// Explicit `[min, max]` extent; when absent an extent step is generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<[f64; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxbins: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minstep: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<f64>,
}

impl BinParams {
    pub fn with_maxbins(mut self, maxbins: u32) -> Self {
        self.maxbins = Some(maxbins);
        self
    }

    pub fn with_extent(mut self, min: f64, max: f64) -> Self {
        self.extent = Some([min, max]);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Reject parameters no bin step can honour
    pub fn validate(&self) -> Result<()> {
        if let Some([min, max]) = self.extent {
            if !(min <= max) {
                return Err(CoreError::InvalidBin(format!(
                    "extent [{}, {}] is empty",
                    min, max
                )));
            }
        }
        if self.maxbins == Some(0) {
            return Err(CoreError::InvalidBin("maxbins must be positive".to_string()));
        }
        if let Some(step) = self.step {
            if step <= 0.0 {
                return Err(CoreError::InvalidBin(format!("step {} must be positive", step)));
            }
        }
        Ok(())
    }

    /// Fill in `maxbins` when neither a bin count nor a step is given
    fn normalized(mut self) -> Self {
        if self.maxbins.is_none() && self.step.is_none() {
            self.maxbins = Some(DEFAULT_MAXBINS);
        }
        self
    }

    /// Stable textual form, e.g. `bin_maxbins_10` or `bin_extent_0_100_step_5`
    pub fn to_key_string(&self) -> String {
        let mut key = String::from("bin");
        if let Some([min, max]) = self.extent {
            key.push_str(&format!("_extent_{}_{}", min, max));
        }
        if let Some(maxbins) = self.maxbins {
            key.push_str(&format!("_maxbins_{}", maxbins));
        }
        if let Some(step) = self.step {
            key.push_str(&format!("_step_{}", step));
        }
        if let Some(minstep) = self.minstep {
            key.push_str(&format!("_minstep_{}", minstep));
        }
        if let Some(nice) = self.nice {
            key.push_str(&format!("_nice_{}", nice));
        }
        if let Some(base) = self.base {
            key.push_str(&format!("_base_{}", base));
        }
        key
    }
}

/// Key identifying one (parameters, field) binning
pub fn bin_key(params: &BinParams, field: &str) -> String {
    format!("{}_{}", params.to_key_string(), field)
}
