//! Resolved model tree

use super::channel::Channel;
use super::config::ModelConfig;
use super::data::DataSource;
use super::field_def::FieldDef;
use super::transform::TransformSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mark type of a unit model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Point,
    Circle,
    Square,
    Tick,
    Bar,
    Rect,
    Rule,
    Text,
    Line,
    Area,
}

impl Mark {
    /// Marks drawn as a connected path
    pub fn is_path(&self) -> bool {
        matches!(self, Mark::Line | Mark::Area)
    }
}

/// Stack offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackOffset {
    #[default]
    Zero,
    Center,
    Normalize,
}

impl StackOffset {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackOffset::Zero => "zero",
            StackOffset::Center => "center",
            StackOffset::Normalize => "normalize",
        }
    }
}

/// Stacking resolved by the upstream resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackProperties {
    /// Channel whose field is stacked
    pub field_channel: Channel,

    /// Channel whose field identifies a stack
    #[serde(default)]
    pub groupby_channel: Option<Channel>,

    /// Channels whose fields order the layers within a stack
    #[serde(default)]
    pub stack_by: Vec<Channel>,

    #[serde(default)]
    pub offset: StackOffset,
}

/// Row / column facet fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetMapping {
    #[serde(default)]
    pub row: Option<FieldDef>,
    #[serde(default)]
    pub column: Option<FieldDef>,
}

impl FacetMapping {
    /// Declared facet channels with their field definitions, column first
    pub fn field_defs(&self) -> Vec<(Channel, &FieldDef)> {
        let mut defs = Vec::new();
        if let Some(column) = &self.column {
            defs.push((Channel::Column, column));
        }
        if let Some(row) = &self.row {
            defs.push((Channel::Row, row));
        }
        defs
    }
}

/// Named outputs a model may request from the dataflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOutput {
    /// Data before aggregation
    Raw,
    /// Data read by marks
    Main,
}

/// Composition structure of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelKind {
    Unit {
        mark: Mark,
        #[serde(default)]
        encoding: BTreeMap<Channel, FieldDef>,
        #[serde(default)]
        stack: Option<StackProperties>,
    },
    Layer {
        #[serde(default)]
        children: Vec<ResolvedModel>,
    },
    Facet {
        facet: FacetMapping,
        child: Box<ResolvedModel>,
    },
}

/// A model as handed over by the resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedModel {
    /// Model name, used as a prefix for generated names; empty for the root
    #[serde(default)]
    pub name: String,

    /// Own data source; when absent the model inherits its parent's data
    #[serde(default)]
    pub data: Option<DataSource>,

    /// User transforms in declaration order
    #[serde(default)]
    pub transform: Vec<TransformSpec>,

    #[serde(default)]
    pub config: ModelConfig,

    /// Outputs other components will read by name
    #[serde(default)]
    pub requested_data: Vec<DataOutput>,

    pub kind: ModelKind,
}

impl ResolvedModel {
    /// Create an unnamed unit model
    pub fn unit(mark: Mark) -> Self {
        Self::with_kind(ModelKind::Unit {
            mark,
            encoding: BTreeMap::new(),
            stack: None,
        })
    }

    /// Create an unnamed layer model
    pub fn layer(children: Vec<ResolvedModel>) -> Self {
        Self::with_kind(ModelKind::Layer { children })
    }

    /// Create an unnamed facet model
    pub fn facet(facet: FacetMapping, child: ResolvedModel) -> Self {
        Self::with_kind(ModelKind::Facet {
            facet,
            child: Box::new(child),
        })
    }

    fn with_kind(kind: ModelKind) -> Self {
        Self {
            name: String::new(),
            data: None,
            transform: Vec::new(),
            config: ModelConfig::default(),
            requested_data: Vec::new(),
            kind,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_data(mut self, data: DataSource) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_transform(mut self, transform: TransformSpec) -> Self {
        self.transform.push(transform);
        self
    }

    pub fn request(mut self, output: DataOutput) -> Self {
        if !self.requested_data.contains(&output) {
            self.requested_data.push(output);
        }
        self
    }

    /// Add a channel to a unit model's encoding; ignored for other kinds
    pub fn encode(mut self, channel: Channel, field_def: FieldDef) -> Self {
        if let ModelKind::Unit { encoding, .. } = &mut self.kind {
            encoding.insert(channel, field_def);
        }
        self
    }

    /// Set a unit model's stack properties; ignored for other kinds
    pub fn with_stack(mut self, properties: StackProperties) -> Self {
        if let ModelKind::Unit { stack, .. } = &mut self.kind {
            *stack = Some(properties);
        }
        self
    }

    /// Generated name scoped to this model
    pub fn get_name(&self, text: &str) -> String {
        if self.name.is_empty() {
            text.to_string()
        } else {
            format!("{}_{}", self.name, text)
        }
    }

    /// Whether this model requested the given output
    pub fn requests(&self, output: DataOutput) -> bool {
        self.requested_data.contains(&output)
    }

    /// Field definitions that feed this model's own data stages.
    ///
    /// Unit models contribute their encoding, facet models their row/column
    /// fields; layers contribute nothing.
    pub fn field_defs(&self) -> Vec<(Channel, &FieldDef)> {
        match &self.kind {
            ModelKind::Unit { encoding, .. } => encoding.iter().map(|(c, f)| (*c, f)).collect(),
            ModelKind::Facet { facet, .. } => facet.field_defs(),
            ModelKind::Layer { .. } => Vec::new(),
        }
    }

    /// Direct child models
    pub fn children(&self) -> Vec<&ResolvedModel> {
        match &self.kind {
            ModelKind::Unit { .. } => Vec::new(),
            ModelKind::Layer { children } => children.iter().collect(),
            ModelKind::Facet { child, .. } => vec![child.as_ref()],
        }
    }

    /// Field definition of a unit model channel
    pub fn channel(&self, channel: Channel) -> Option<&FieldDef> {
        match &self.kind {
            ModelKind::Unit { encoding, .. } => encoding.get(&channel),
            ModelKind::Facet { facet, .. } => match channel {
                Channel::Row => facet.row.as_ref(),
                Channel::Column => facet.column.as_ref(),
                _ => None,
            },
            ModelKind::Layer { .. } => None,
        }
    }
}
