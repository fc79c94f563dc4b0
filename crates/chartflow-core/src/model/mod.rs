//! Resolved model definitions
//!
//! A resolved model is what the upstream spec resolver hands to the compiler:
//! per-channel field metadata with scales and guides already decided, the
//! user transform list, and the composition structure (unit, layer, facet).

pub mod bin;
pub mod channel;
pub mod config;
pub mod data;
pub mod field_def;
pub mod model;
pub mod predicate;
pub mod timeunit;
pub mod transform;

pub use bin::{bin_key, BinParams, BinSpec, DEFAULT_MAXBINS};
pub use channel::Channel;
pub use config::ModelConfig;
pub use data::{DataFormat, DataSource};
pub use field_def::{AggregateOp, BinSuffix, FieldDef, FieldType, GuideDef, ScaleDef, ScaleType, SortOrder};
pub use model::{DataOutput, FacetMapping, Mark, ModelKind, ResolvedModel, StackOffset, StackProperties};
pub use predicate::Predicate;
pub use timeunit::TimeUnit;
pub use transform::TransformSpec;

/// Convert an arbitrary name into a valid signal identifier.
///
/// Characters outside `[A-Za-z0-9_$]` become `_`, and a leading digit is
/// prefixed with `_`.
pub fn var_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Accessor expression for a datum field
pub fn datum(field: &str) -> String {
    format!("datum[\"{}\"]", field)
}
