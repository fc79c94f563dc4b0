//! Model-level configuration

use serde::{Deserialize, Serialize};

/// Configuration carried by a resolved model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number format used for bin range labels when no guide format is set
    #[serde(default = "default_number_format")]
    pub number_format: String,

    /// Whether invalid (null / NaN) values are dropped.
    ///
    /// `None` drops invalid values of quantitative and temporal fields only.
    #[serde(default)]
    pub filter_invalid: Option<bool>,
}

fn default_number_format() -> String {
    "s".to_string()
}

impl ModelConfig {
    /// Set the invalid-value policy
    pub fn with_filter_invalid(mut self, filter_invalid: bool) -> Self {
        self.filter_invalid = Some(filter_invalid);
        self
    }

    /// Set the number format
    pub fn with_number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = format.into();
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            number_format: default_number_format(),
            filter_invalid: None,
        }
    }
}
