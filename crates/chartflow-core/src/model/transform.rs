//! User-declared transforms

use super::predicate::Predicate;
use serde::{Deserialize, Serialize};

/// One entry of a model's `transform` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformSpec {
    Filter {
        filter: Predicate,
    },
    Calculate {
        calculate: String,
        #[serde(rename = "as")]
        as_field: String,
    },
}

impl TransformSpec {
    pub fn filter(predicate: Predicate) -> Self {
        TransformSpec::Filter { filter: predicate }
    }

    pub fn calculate(expr: impl Into<String>, as_field: impl Into<String>) -> Self {
        TransformSpec::Calculate {
            calculate: expr.into(),
            as_field: as_field.into(),
        }
    }
}
