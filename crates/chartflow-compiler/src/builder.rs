//! Dataflow construction
//!
//! Builds one linear chain per resolved model:
//!
//! ```text
//! Source -> Parse -> transforms -> NullFilter -> Bin -> TimeUnit -> Output(raw)
//!   -> Aggregate -> Order -> Stack -> NonPositiveFilter -> Output(main)
//!   -> { FacetAggregate(column), FacetAggregate(row), Facet }
//! ```
//!
//! Every stage is optional and only inserted when it has content. Models
//! without their own data continue from the parent's facet boundary or main
//! output; identical data declarations share one source node.

use crate::dataflow::aggregate::AggregateNode;
use crate::dataflow::bin::BinNode;
use crate::dataflow::facet::{FacetAggregateNode, FacetNode};
use crate::dataflow::non_positive_filter::NonPositiveFilterNode;
use crate::dataflow::null_filter::NullFilterNode;
use crate::dataflow::order::OrderNode;
use crate::dataflow::output::OutputNode;
use crate::dataflow::parse::ParseNode;
use crate::dataflow::source::SourceNode;
use crate::dataflow::stack::StackNode;
use crate::dataflow::time_unit::TimeUnitNode;
use crate::dataflow::transforms::transform_nodes;
use crate::dataflow::{DataflowGraph, NodeId, NodeKind};
use crate::error::{CompileError, Result};
use chartflow_core::model::{Channel, DataOutput, FacetMapping, ModelKind, ResolvedModel};
use std::collections::HashMap;

/// Checkpoints of one model's chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataComponent {
    /// Model name
    pub model: String,
    /// Output before aggregation
    pub raw: Option<NodeId>,
    /// Output read by the model's marks and by children without data
    pub main: Option<NodeId>,
    /// Facet boundary children continue from
    pub facet_root: Option<NodeId>,
    pub row: Option<NodeId>,
    pub column: Option<NodeId>,
}

impl DataComponent {
    /// Node a child without its own data attaches to
    pub fn inherited_head(&self) -> Option<NodeId> {
        self.facet_root.or(self.main)
    }
}

/// Builds the dataflow forest for a model tree
#[derive(Debug, Default)]
pub struct DataflowBuilder {
    graph: DataflowGraph,
    /// Source content hash -> source node, scoped to one compilation
    sources: HashMap<String, NodeId>,
    components: Vec<DataComponent>,
}

impl DataflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the chains of `model` and all nested models
    pub fn build(&mut self, model: &ResolvedModel) -> Result<&DataComponent> {
        self.build_model(model, None)?;
        self.components.last().ok_or_else(|| {
            CompileError::InvalidGraphOperation("no data component was built".to_string())
        })
    }

    pub fn graph(&self) -> &DataflowGraph {
        &self.graph
    }

    pub fn into_graph(self) -> DataflowGraph {
        self.graph
    }

    /// Components in build order, children before parents
    pub fn components(&self) -> &[DataComponent] {
        &self.components
    }

    /// Component of a model by name
    pub fn component(&self, model: &str) -> Option<&DataComponent> {
        self.components.iter().find(|c| c.model == model)
    }

    fn build_model(
        &mut self,
        model: &ResolvedModel,
        parent: Option<&DataComponent>,
    ) -> Result<DataComponent> {
        let inherited = parent.and_then(DataComponent::inherited_head);
        let component = match (&model.kind, &model.data, inherited) {
            // A layer without any data only groups children that bring their own
            (ModelKind::Layer { .. }, None, None) => DataComponent {
                model: model.name.clone(),
                ..Default::default()
            },
            _ => self.parse_model(model, inherited)?,
        };

        for child in model.children() {
            self.build_model(child, Some(&component))?;
        }

        self.components.push(component.clone());
        Ok(component)
    }

    fn parse_root(&mut self, model: &ResolvedModel, inherited: Option<NodeId>) -> Result<NodeId> {
        let Some(data) = &model.data else {
            return inherited.ok_or_else(|| CompileError::MissingDataSource {
                model: display_name(model),
            });
        };

        let source = SourceNode::new(data.clone())?;
        if let Some(&existing) = self.sources.get(source.hash()) {
            log::debug!(
                "Model '{}' reuses source {}",
                display_name(model),
                existing
            );
            return Ok(existing);
        }

        let hash = source.hash().to_string();
        let id = self.graph.add(NodeKind::Source(source));
        self.sources.insert(hash, id);
        Ok(id)
    }

    fn parse_model(
        &mut self,
        model: &ResolvedModel,
        inherited: Option<NodeId>,
    ) -> Result<DataComponent> {
        let mut head = self.parse_root(model, inherited)?;

        if let Some(parse) = ParseNode::from_model(model) {
            head = self.graph.add_child(head, NodeKind::Parse(parse))?;
        }

        for kind in transform_nodes(model) {
            head = self.graph.add_child(head, kind)?;
        }

        if let Some(null_filter) = NullFilterNode::from_model(model) {
            head = self.graph.add_child(head, NodeKind::NullFilter(null_filter))?;
        }

        if let Some(bin) = BinNode::from_model(model)? {
            head = self.graph.add_child(head, NodeKind::Bin(bin))?;
        }

        if let Some(time_unit) = TimeUnitNode::from_model(model) {
            head = self.graph.add_child(head, NodeKind::TimeUnit(time_unit))?;
        }

        let raw = self.graph.add_child(
            head,
            NodeKind::Output(OutputNode::new(
                model.get_name("raw"),
                model.requests(DataOutput::Raw),
            )),
        )?;
        head = raw;

        let is_unit = matches!(model.kind, ModelKind::Unit { .. });
        if is_unit {
            if let Some(aggregate) = AggregateNode::from_model(model) {
                head = self.graph.add_child(head, NodeKind::Aggregate(aggregate))?;
            }
            if let Some(order) = OrderNode::from_model(model) {
                head = self.graph.add_child(head, NodeKind::Order(order))?;
            }
            if let Some(stack) = StackNode::from_model(model)? {
                head = self.graph.add_child(head, NodeKind::Stack(stack))?;
            }
            if let Some(filter) = NonPositiveFilterNode::from_model(model) {
                head = self.graph.add_child(head, NodeKind::NonPositiveFilter(filter))?;
            }
        }

        let main = self.graph.add_child(
            head,
            NodeKind::Output(OutputNode::new(
                model.get_name("main"),
                is_unit || model.requests(DataOutput::Main),
            )),
        )?;

        let mut component = DataComponent {
            model: model.name.clone(),
            raw: Some(raw),
            main: Some(main),
            ..Default::default()
        };

        if let ModelKind::Facet { facet, .. } = &model.kind {
            self.parse_facet(model, facet, main, &mut component)?;
        }

        Ok(component)
    }

    fn parse_facet(
        &mut self,
        model: &ResolvedModel,
        facet: &FacetMapping,
        main: NodeId,
        component: &mut DataComponent,
    ) -> Result<()> {
        if facet.column.is_some() {
            let node = FacetAggregateNode::new(model, Channel::Column)?;
            component.column = Some(self.graph.add_child(main, NodeKind::FacetAggregate(node))?);
        }
        if facet.row.is_some() {
            let node = FacetAggregateNode::new(model, Channel::Row)?;
            component.row = Some(self.graph.add_child(main, NodeKind::FacetAggregate(node))?);
        }
        if let Some(facet_node) = FacetNode::from_model(model) {
            component.facet_root = Some(self.graph.add_child(main, NodeKind::Facet(facet_node))?);
        }
        Ok(())
    }
}

fn display_name(model: &ResolvedModel) -> String {
    if model.name.is_empty() {
        "<root>".to_string()
    } else {
        model.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataflow::NodeTag;
    use chartflow_core::model::{
        BinSpec, DataSource, FieldDef, FieldType, Mark, ModelConfig, Predicate, TransformSpec,
    };

    fn chain_tags(graph: &DataflowGraph) -> Vec<NodeTag> {
        graph.walk().into_iter().map(|id| graph.tag(id)).collect()
    }

    #[test]
    fn test_minimal_chain() {
        let model = ResolvedModel::unit(Mark::Point)
            .with_data(DataSource::url("data.json"))
            .encode(Channel::X, FieldDef::new("a", FieldType::Nominal))
            .with_config(ModelConfig::default().with_filter_invalid(false));

        let mut builder = DataflowBuilder::new();
        builder.build(&model).unwrap();
        assert_eq!(
            chain_tags(builder.graph()),
            vec![NodeTag::Source, NodeTag::NullFilter, NodeTag::Output, NodeTag::Output]
        );
    }

    #[test]
    fn test_full_chain_order() {
        let model = ResolvedModel::unit(Mark::Line)
            .with_data(DataSource::url("data.json"))
            .add_transform(TransformSpec::filter(Predicate::expression("datum.a > 0")))
            .add_transform(TransformSpec::calculate("datum.a * 2", "b"))
            .encode(
                Channel::X,
                FieldDef::new("a", FieldType::Quantitative).with_bin(BinSpec::Flag(true)),
            )
            .encode(
                Channel::Y,
                FieldDef::new("t", FieldType::Temporal)
                    .with_time_unit(chartflow_core::model::TimeUnit::Year),
            )
            .encode(Channel::Color, FieldDef::count());

        let mut builder = DataflowBuilder::new();
        builder.build(&model).unwrap();
        assert_eq!(
            chain_tags(builder.graph()),
            vec![
                NodeTag::Source,
                NodeTag::Parse,
                NodeTag::Filter,
                NodeTag::Calculate,
                NodeTag::NullFilter,
                NodeTag::Bin,
                NodeTag::TimeUnit,
                NodeTag::Output,
                NodeTag::Aggregate,
                NodeTag::Order,
                NodeTag::Output,
            ]
        );
    }

    #[test]
    fn test_identical_sources_are_shared() {
        let child = |name: &str| {
            ResolvedModel::unit(Mark::Point)
                .with_name(name)
                .with_data(DataSource::url("cars.json"))
        };
        let model = ResolvedModel::layer(vec![child("layer_0"), child("layer_1")]);

        let mut builder = DataflowBuilder::new();
        builder.build(&model).unwrap();

        let graph = builder.graph();
        assert_eq!(graph.roots().len(), 1);
        let root = graph.roots()[0];
        assert_eq!(graph.children(root).len(), 2);

        let layer = builder.component("").unwrap();
        assert_eq!(layer.main, None);
    }

    #[test]
    fn test_children_inherit_main() {
        let model = ResolvedModel::layer(vec![
            ResolvedModel::unit(Mark::Point).with_name("layer_0"),
            ResolvedModel::unit(Mark::Line).with_name("layer_1"),
        ])
        .with_data(DataSource::url("cars.json"));

        let mut builder = DataflowBuilder::new();
        builder.build(&model).unwrap();

        let main = builder.component("").and_then(|c| c.main).unwrap();
        let graph = builder.graph();
        assert_eq!(graph.children(main).len(), 2);
        for &child in graph.children(main) {
            assert_eq!(graph.tag(child), NodeTag::Output);
        }
        assert!(builder.component("layer_1").and_then(|c| c.raw).is_some());
    }

    #[test]
    fn test_facet_outputs_hang_off_main() {
        let model = ResolvedModel::facet(
            FacetMapping {
                row: Some(FieldDef::new("r", FieldType::Nominal)),
                column: Some(FieldDef::new("c", FieldType::Nominal)),
            },
            ResolvedModel::unit(Mark::Point).with_name("child"),
        )
        .with_data(DataSource::url("cars.json"));

        let mut builder = DataflowBuilder::new();
        let component = builder.build(&model).unwrap().clone();

        let graph = builder.graph();
        let main = component.main.unwrap();
        let children: Vec<NodeTag> = graph.children(main).iter().map(|&c| graph.tag(c)).collect();
        assert_eq!(
            children,
            vec![NodeTag::FacetAggregate, NodeTag::FacetAggregate, NodeTag::Facet]
        );

        let facet_root = component.facet_root.unwrap();
        let child_main = builder.component("child").and_then(|c| c.main).unwrap();
        assert_eq!(graph.root_of(child_main), graph.root_of(facet_root));
        assert!(graph.is_ancestor(facet_root, child_main));
    }

    #[test]
    fn test_missing_data() {
        let model = ResolvedModel::unit(Mark::Point);
        let mut builder = DataflowBuilder::new();
        assert!(matches!(
            builder.build(&model),
            Err(CompileError::MissingDataSource { .. })
        ));
    }
}
