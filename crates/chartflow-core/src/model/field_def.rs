//! Field definitions
//!
//! A field definition describes what one encoding channel reads from the data
//! and how: declared type, aggregation, binning, time truncation, and the scale
//! and guide configuration the resolver settled on.

use super::bin::{bin_key, BinParams, BinSpec};
use super::timeunit::TimeUnit;
use serde::{Deserialize, Serialize};

/// Declared measurement type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Quantitative,
    Ordinal,
    Nominal,
    Temporal,
}

/// Aggregation operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    Count,
    Valid,
    Missing,
    Distinct,
    Sum,
    Mean,
    Average,
    Variance,
    Stdev,
    Median,
    Q1,
    Q3,
    Min,
    Max,
}

impl AggregateOp {
    /// Operation name as emitted in aggregate steps
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateOp::Count => "count",
            AggregateOp::Valid => "valid",
            AggregateOp::Missing => "missing",
            AggregateOp::Distinct => "distinct",
            AggregateOp::Sum => "sum",
            AggregateOp::Mean => "mean",
            AggregateOp::Average => "average",
            AggregateOp::Variance => "variance",
            AggregateOp::Stdev => "stdev",
            AggregateOp::Median => "median",
            AggregateOp::Q1 => "q1",
            AggregateOp::Q3 => "q3",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
        }
    }
}

/// Scale type chosen for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Linear,
    Log,
    Pow,
    Sqrt,
    Time,
    Utc,
    Sequential,
    Ordinal,
    Band,
    Point,
}

impl ScaleType {
    /// Whether the scale maps a discrete domain
    pub fn has_discrete_domain(&self) -> bool {
        matches!(self, ScaleType::Ordinal | ScaleType::Band | ScaleType::Point)
    }
}

/// Resolved scale configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleDef {
    #[serde(rename = "type")]
    pub scale_type: ScaleType,
}

/// Resolved axis or legend configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideDef {
    /// Number or date format for labels
    #[serde(default)]
    pub format: Option<String>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

/// Suffix of a generated bin field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinSuffix {
    Start,
    End,
    Range,
}

impl BinSuffix {
    fn as_str(&self) -> &'static str {
        match self {
            BinSuffix::Start => "start",
            BinSuffix::End => "end",
            BinSuffix::Range => "range",
        }
    }
}

/// Field definition of one encoding channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Source field name (absent for `count`)
    #[serde(default)]
    pub field: Option<String>,

    /// Declared type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub aggregate: Option<AggregateOp>,

    #[serde(default)]
    pub bin: Option<BinSpec>,

    #[serde(default)]
    pub time_unit: Option<TimeUnit>,

    #[serde(default)]
    pub scale: Option<ScaleDef>,

    #[serde(default)]
    pub axis: Option<GuideDef>,

    #[serde(default)]
    pub legend: Option<GuideDef>,

    /// Sort direction, read by the `order` channel
    #[serde(default)]
    pub sort: Option<SortOrder>,
}

impl FieldDef {
    /// Create a field definition for a named field
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: Some(field.into()),
            field_type,
            aggregate: None,
            bin: None,
            time_unit: None,
            scale: None,
            axis: None,
            legend: None,
            sort: None,
        }
    }

    /// Create a `count(*)` field definition
    pub fn count() -> Self {
        Self {
            field: None,
            field_type: FieldType::Quantitative,
            aggregate: Some(AggregateOp::Count),
            bin: None,
            time_unit: None,
            scale: None,
            axis: None,
            legend: None,
            sort: None,
        }
    }

    pub fn with_aggregate(mut self, op: AggregateOp) -> Self {
        self.aggregate = Some(op);
        self
    }

    pub fn with_bin(mut self, bin: BinSpec) -> Self {
        self.bin = Some(bin);
        self
    }

    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = Some(time_unit);
        self
    }

    pub fn with_scale(mut self, scale_type: ScaleType) -> Self {
        self.scale = Some(ScaleDef { scale_type });
        self
    }

    pub fn with_axis_format(mut self, format: impl Into<String>) -> Self {
        self.axis = Some(GuideDef {
            format: Some(format.into()),
        });
        self
    }

    pub fn with_legend_format(mut self, format: impl Into<String>) -> Self {
        self.legend = Some(GuideDef {
            format: Some(format.into()),
        });
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Whether this is a `count` aggregate
    pub fn is_count(&self) -> bool {
        self.aggregate == Some(AggregateOp::Count)
    }

    /// Normalized bin parameters, if the field is binned
    pub fn bin_params(&self) -> Option<BinParams> {
        self.bin.as_ref().and_then(BinSpec::params)
    }

    /// Key shared by every channel that bins this field with the same parameters
    pub fn bin_key(&self) -> Option<String> {
        let params = self.bin_params()?;
        let field = self.field.as_deref()?;
        Some(bin_key(&params, field))
    }

    /// Name of a generated bin field (`{key}_start`, `{key}_end`, `{key}_range`)
    pub fn bin_output(&self, suffix: BinSuffix) -> Option<String> {
        self.bin_key()
            .map(|key| format!("{}_{}", key, suffix.as_str()))
    }

    /// Name of the field this definition reads after all derivations
    pub fn output_name(&self) -> Option<String> {
        if self.is_count() {
            return Some("count_*".to_string());
        }
        let field = self.field.as_deref()?;
        if let Some(op) = self.aggregate {
            return Some(format!("{}_{}", op.as_str(), field));
        }
        if self.bin_params().is_some() {
            return self.bin_output(BinSuffix::Start);
        }
        if let Some(unit) = self.time_unit {
            return Some(format!("{}_{}", unit.as_str(), field));
        }
        Some(field.to_string())
    }

    /// Whether the channel's scale has a discrete domain
    pub fn has_discrete_scale(&self) -> bool {
        self.scale
            .as_ref()
            .map(|s| s.scale_type.has_discrete_domain())
            .unwrap_or(false)
    }

    /// Whether the channel's scale is logarithmic
    pub fn has_log_scale(&self) -> bool {
        matches!(self.scale, Some(ScaleDef { scale_type: ScaleType::Log }))
    }

    /// Label format from the axis, falling back to the legend
    pub fn guide_format(&self) -> Option<&str> {
        self.axis
            .as_ref()
            .and_then(|a| a.format.as_deref())
            .or_else(|| self.legend.as_ref().and_then(|l| l.format.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name_plain_and_aggregate() {
        let plain = FieldDef::new("price", FieldType::Quantitative);
        assert_eq!(plain.output_name().as_deref(), Some("price"));

        let summed = plain.clone().with_aggregate(AggregateOp::Sum);
        assert_eq!(summed.output_name().as_deref(), Some("sum_price"));

        assert_eq!(FieldDef::count().output_name().as_deref(), Some("count_*"));
    }

    #[test]
    fn test_output_name_bin_and_time_unit() {
        let binned = FieldDef::new("x", FieldType::Quantitative).with_bin(BinSpec::Flag(true));
        assert_eq!(binned.output_name().as_deref(), Some("bin_maxbins_10_x_start"));
        assert_eq!(
            binned.bin_output(BinSuffix::Range).as_deref(),
            Some("bin_maxbins_10_x_range")
        );

        let monthly = FieldDef::new("date", FieldType::Temporal).with_time_unit(TimeUnit::Month);
        assert_eq!(monthly.output_name().as_deref(), Some("month_date"));
    }

    #[test]
    fn test_unbinned_flag() {
        let def = FieldDef::new("x", FieldType::Quantitative).with_bin(BinSpec::Flag(false));
        assert!(def.bin_params().is_none());
        assert_eq!(def.output_name().as_deref(), Some("x"));
    }

    #[test]
    fn test_guide_format_prefers_axis() {
        let def = FieldDef::new("x", FieldType::Quantitative)
            .with_legend_format(".1f")
            .with_axis_format("d");
        assert_eq!(def.guide_format(), Some("d"));

        let legend_only = FieldDef::new("x", FieldType::Quantitative).with_legend_format(".1f");
        assert_eq!(legend_only.guide_format(), Some(".1f"));
    }

    #[test]
    fn test_scale_predicates() {
        let def = FieldDef::new("x", FieldType::Quantitative).with_scale(ScaleType::Log);
        assert!(def.has_log_scale());
        assert!(!def.has_discrete_scale());

        let banded = FieldDef::new("x", FieldType::Ordinal).with_scale(ScaleType::Band);
        assert!(banded.has_discrete_scale());
    }

    #[test]
    fn test_deserialize_field_def() {
        let def: FieldDef = serde_json::from_str(
            r#"{"field": "x", "type": "quantitative", "bin": {"maxbins": 20}, "scale": {"type": "band"}}"#,
        )
        .unwrap();
        assert_eq!(def.field.as_deref(), Some("x"));
        assert_eq!(def.bin_key().as_deref(), Some("bin_maxbins_20_x"));
        assert!(def.has_discrete_scale());
    }
}
