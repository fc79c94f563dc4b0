//! Filter predicates and their expression form

use super::datum;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A filter predicate: raw expression text or a field predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predicate {
    Expression(String),
    Equal { field: String, equal: Value },
    Range { field: String, range: [f64; 2] },
    OneOf { field: String, one_of: Vec<Value> },
}

impl Predicate {
    pub fn expression(expr: impl Into<String>) -> Self {
        Predicate::Expression(expr.into())
    }

    /// Reject predicates that can never be evaluated
    pub fn validate(&self) -> Result<()> {
        match self {
            Predicate::Expression(expr) if expr.trim().is_empty() => {
                Err(CoreError::InvalidPredicate("empty expression".to_string()))
            }
            Predicate::Range { field, range } if !(range[0] <= range[1]) => {
                Err(CoreError::InvalidPredicate(format!(
                    "range [{}, {}] on '{}' is empty",
                    range[0], range[1], field
                )))
            }
            Predicate::OneOf { field, one_of } if one_of.is_empty() => Err(
                CoreError::InvalidPredicate(format!("one_of on '{}' has no values", field)),
            ),
            _ => Ok(()),
        }
    }

    /// Expression text of this predicate
    pub fn to_expr(&self) -> String {
        match self {
            Predicate::Expression(expr) => expr.clone(),
            Predicate::Equal { field, equal } => format!("{}==={}", datum(field), equal),
            Predicate::Range { field, range } => {
                format!("inrange({}, {}, {})", datum(field), range[0], range[1])
            }
            Predicate::OneOf { field, one_of } => {
                let values: Vec<String> = one_of.iter().map(Value::to_string).collect();
                format!("indexof([{}], {}) !== -1", values.join(","), datum(field))
            }
        }
    }
}

/// Conjunction of predicates, in order
pub fn conjunction(predicates: &[Predicate]) -> String {
    match predicates {
        [single] => single.to_expr(),
        _ => predicates
            .iter()
            .map(|p| format!("({})", p.to_expr()))
            .collect::<Vec<_>>()
            .join(" && "),
    }
}
