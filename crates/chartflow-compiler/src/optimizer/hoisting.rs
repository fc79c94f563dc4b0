//! Hoisting passes
//!
//! Each pass handles one node kind. Starting at every leaf it walks toward
//! the root; at each node of its kind it merges the node into a parent of the
//! same kind, swaps it above its parent when that preserves the result, or
//! stops there. A pass repeats until a full sweep leaves the graph untouched.

use crate::compiler::FacetHoistPolicy;
use crate::dataflow::{DataflowGraph, NodeId, NodeKind, NodeTag};
use crate::error::{CompileError, Result};
use std::fmt;

/// One bottom-up pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoistPass {
    Stack,
    Aggregate,
    Bin,
    TimeUnit,
    NullFilter,
    /// Filter and calculate nodes
    Transforms,
    Parse,
}

/// Pass order: later passes move pipeline-earlier kinds, which clears the
/// way for merges the earlier passes could not make yet
pub const PASS_ORDER: [HoistPass; 7] = [
    HoistPass::Stack,
    HoistPass::Aggregate,
    HoistPass::Bin,
    HoistPass::TimeUnit,
    HoistPass::NullFilter,
    HoistPass::Transforms,
    HoistPass::Parse,
];

impl HoistPass {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoistPass::Stack => "stack",
            HoistPass::Aggregate => "aggregate",
            HoistPass::Bin => "bin",
            HoistPass::TimeUnit => "timeunit",
            HoistPass::NullFilter => "nullfilter",
            HoistPass::Transforms => "transforms",
            HoistPass::Parse => "parse",
        }
    }

    /// Whether this pass moves nodes of the given kind
    pub fn handles(&self, tag: NodeTag) -> bool {
        match self {
            HoistPass::Stack => tag == NodeTag::Stack,
            HoistPass::Aggregate => tag == NodeTag::Aggregate,
            HoistPass::Bin => tag == NodeTag::Bin,
            HoistPass::TimeUnit => tag == NodeTag::TimeUnit,
            HoistPass::NullFilter => tag == NodeTag::NullFilter,
            HoistPass::Transforms => matches!(tag, NodeTag::Filter | NodeTag::Calculate),
            HoistPass::Parse => tag == NodeTag::Parse,
        }
    }

    /// Run the pass to a fixed point, returning the number of sweeps
    pub fn run(
        &self,
        graph: &mut DataflowGraph,
        policy: FacetHoistPolicy,
        max_iterations: usize,
    ) -> Result<usize> {
        for iteration in 1..=max_iterations {
            let before = graph.revision();
            for leaf in graph.leaves() {
                if !graph.is_attached(leaf) {
                    continue;
                }
                let mut current = leaf;
                while let Some(parent) = graph.parent(current) {
                    current = self.step(graph, current, parent, policy)?;
                }
            }
            if graph.revision() == before {
                return Ok(iteration);
            }
        }
        Err(CompileError::OptimizerDidNotConverge {
            pass: self.as_str().to_string(),
            iterations: max_iterations,
        })
    }

    /// Apply the rule at `node`, returning where the walk continues
    fn step(
        &self,
        graph: &mut DataflowGraph,
        node: NodeId,
        parent: NodeId,
        policy: FacetHoistPolicy,
    ) -> Result<NodeId> {
        if !self.handles(graph.tag(node)) {
            return Ok(parent);
        }

        match decide(graph, node, parent, policy) {
            Move::Merge => graph.merge(parent, node)?,
            Move::Swap { fold } => {
                if let Some(fields) = fold {
                    add_dimensions(graph, node, &fields);
                }
                graph.swap_with_parent(node)?;
            }
            Move::Relocate => relocate_to_source(graph, node)?,
            Move::Stop => {}
        }
        Ok(parent)
    }
}

impl fmt::Display for HoistPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Move {
    /// Absorb the node into its parent
    Merge,
    /// Swap above the parent, first adding the given facet fields to the
    /// node's group-by
    Swap { fold: Option<Vec<String>> },
    /// Move a parse node next to its source
    Relocate,
    Stop,
}

/// How a node may pass a parent of a different kind
#[derive(Debug, Clone, PartialEq)]
enum Passage {
    Free,
    FoldFacet(Vec<String>),
}

fn is_mergeable(tag: NodeTag) -> bool {
    matches!(
        tag,
        NodeTag::Parse
            | NodeTag::Filter
            | NodeTag::NullFilter
            | NodeTag::Bin
            | NodeTag::TimeUnit
            | NodeTag::Aggregate
    )
}

fn decide(graph: &DataflowGraph, node: NodeId, parent: NodeId, policy: FacetHoistPolicy) -> Move {
    let kind = graph.kind(node);
    let parent_kind = graph.kind(parent);
    let tag = kind.tag();

    if parent_kind.tag() == NodeTag::Source {
        return Move::Stop;
    }
    if tag == parent_kind.tag() && is_mergeable(tag) {
        return Move::Merge;
    }

    let Some(passage) = passage(kind, parent_kind, policy) else {
        return Move::Stop;
    };

    if graph.children(parent).len() == 1 {
        Move::Swap {
            fold: match passage {
                Passage::Free => None,
                Passage::FoldFacet(fields) => Some(fields),
            },
        }
    } else if tag == NodeTag::Parse {
        Move::Relocate
    } else {
        Move::Stop
    }
}

/// Whether `kind` can move above `parent` without changing the result
fn passage(kind: &NodeKind, parent: &NodeKind, policy: FacetHoistPolicy) -> Option<Passage> {
    let tag = kind.tag();
    let groups_rows = matches!(tag, NodeTag::Aggregate | NodeTag::Stack);

    // Parsing happens at load time, whatever the position
    if tag == NodeTag::Parse {
        return match parent {
            NodeKind::Source(_) => None,
            _ => Some(Passage::Free),
        };
    }

    match parent {
        // A calculate may feed any later field, including another calculate
        NodeKind::Source(_)
        | NodeKind::Calculate(_)
        | NodeKind::Aggregate(_)
        | NodeKind::Order(_)
        | NodeKind::Stack(_)
        | NodeKind::NonPositiveFilter(_)
        | NodeKind::FacetAggregate(_) => None,

        NodeKind::Output(output) => {
            if output.required && kind.changes_rows() {
                None
            } else {
                Some(Passage::Free)
            }
        }

        NodeKind::Facet(facet) => {
            if !groups_rows {
                return Some(Passage::Free);
            }
            match policy {
                FacetHoistPolicy::FoldGroupby => Some(Passage::FoldFacet(facet.groupby.clone())),
                FacetHoistPolicy::KeepPartitioned => None,
            }
        }

        NodeKind::Filter(_) => {
            if tag == NodeTag::Calculate || groups_rows {
                None
            } else {
                Some(Passage::Free)
            }
        }

        NodeKind::NullFilter(null_filter) => {
            if groups_rows && !null_filter.is_vacuous() {
                None
            } else {
                Some(Passage::Free)
            }
        }

        NodeKind::Bin(_) | NodeKind::TimeUnit(_) => {
            if groups_rows {
                None
            } else {
                Some(Passage::Free)
            }
        }

        NodeKind::Parse(_) => Some(Passage::Free),
    }
}

fn add_dimensions(graph: &mut DataflowGraph, node: NodeId, fields: &[String]) {
    match graph.kind_mut(node) {
        NodeKind::Aggregate(aggregate) => aggregate.add_dimensions(fields),
        NodeKind::Stack(stack) => stack.add_dimensions(fields),
        _ => {}
    }
}

/// Attach a parse node blocked by a fan-out directly to its source, merging
/// it into a parse already there
fn relocate_to_source(graph: &mut DataflowGraph, node: NodeId) -> Result<()> {
    let root = graph.root_of(node);
    if graph.tag(root) != NodeTag::Source {
        return Err(CompileError::InvalidGraphOperation(format!(
            "{} is not rooted at a source",
            node
        )));
    }

    let existing = graph
        .children(root)
        .iter()
        .copied()
        .find(|&child| child != node && graph.tag(child) == NodeTag::Parse);

    match existing {
        Some(parse) => graph.merge(parse, node),
        None => {
            graph.remove(node)?;
            graph.set_parent(node, root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataflow::{
        AggregateNode, BinNode, CalculateNode, FacetNode, FilterNode, NullFilterNode, OutputNode,
        ParseNode, SourceNode, StackNode,
    };
    use chartflow_core::model::{AggregateOp, DataSource, Predicate, StackOffset};
    use chartflow_core::TransformStep;
    use std::collections::BTreeMap;

    fn source(graph: &mut DataflowGraph) -> NodeId {
        graph.add(NodeKind::Source(SourceNode::new(DataSource::url("a.json")).unwrap()))
    }

    fn filter(expr: &str) -> NodeKind {
        NodeKind::Filter(FilterNode::new(vec![Predicate::expression(expr)]))
    }

    fn calculate(as_field: &str) -> NodeKind {
        NodeKind::Calculate(CalculateNode::new("datum.a", as_field))
    }

    fn parse(field: &str) -> NodeKind {
        NodeKind::Parse(ParseNode::new(BTreeMap::from([(
            field.to_string(),
            "number".to_string(),
        )])))
    }

    fn null_filter(drop: bool) -> NodeKind {
        NodeKind::NullFilter(NullFilterNode::new(BTreeMap::from([("x".to_string(), drop)])))
    }

    fn count_by(field: &str) -> NodeKind {
        let mut aggregate = AggregateNode::default();
        aggregate.add_dimensions(&[field.to_string()]);
        aggregate.measures.push(crate::dataflow::Measure {
            field: "*".to_string(),
            op: AggregateOp::Count,
        });
        NodeKind::Aggregate(aggregate)
    }

    fn stack_by(field: &str) -> NodeKind {
        NodeKind::Stack(StackNode {
            groupby: vec![field.to_string()],
            field: "y".to_string(),
            stack_by: Vec::new(),
            offset: StackOffset::Zero,
        })
    }

    fn chain(graph: &mut DataflowGraph, root: NodeId, kinds: Vec<NodeKind>) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut head = root;
        for kind in kinds {
            head = graph.add_child(head, kind).unwrap();
            ids.push(head);
        }
        ids
    }

    fn tags(graph: &DataflowGraph) -> Vec<NodeTag> {
        graph.walk().into_iter().map(|id| graph.tag(id)).collect()
    }

    fn run(graph: &mut DataflowGraph, pass: HoistPass) {
        pass.run(graph, FacetHoistPolicy::FoldGroupby, 32).unwrap();
    }

    #[test]
    fn test_adjacent_filters_merge() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let ids = chain(&mut graph, root, vec![filter("p1"), filter("p2")]);

        run(&mut graph, HoistPass::Transforms);

        assert_eq!(graph.children(root), &[ids[0]]);
        assert!(!graph.is_attached(ids[1]));
        assert_eq!(
            graph.kind(ids[0]).assemble(),
            vec![TransformStep::filter("(p1) && (p2)")]
        );
    }

    #[test]
    fn test_filter_calculate_order_is_kept() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        chain(
            &mut graph,
            root,
            vec![filter("f1"), calculate("c1"), filter("f2"), null_filter(true)],
        );

        for pass in PASS_ORDER {
            run(&mut graph, pass);
        }

        assert_eq!(
            tags(&graph),
            vec![
                NodeTag::Source,
                NodeTag::Filter,
                NodeTag::Calculate,
                NodeTag::Filter,
                NodeTag::NullFilter
            ]
        );
    }

    #[test]
    fn test_calculate_blocks_calculate() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let ids = chain(&mut graph, root, vec![calculate("a"), calculate("b")]);

        run(&mut graph, HoistPass::Transforms);
        assert_eq!(graph.parent(ids[1]), Some(ids[0]));
    }

    #[test]
    fn test_calculate_blocks_content_kinds() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        chain(
            &mut graph,
            root,
            vec![
                calculate("c"),
                null_filter(true),
                NodeKind::Bin(BinNode::default()),
            ],
        );

        for pass in PASS_ORDER {
            run(&mut graph, pass);
        }

        assert_eq!(
            tags(&graph),
            vec![
                NodeTag::Source,
                NodeTag::Calculate,
                NodeTag::NullFilter,
                NodeTag::Bin
            ]
        );
    }

    #[test]
    fn test_required_output_blocks_filters_only() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let ids = chain(
            &mut graph,
            root,
            vec![
                NodeKind::Output(OutputNode::new("raw", true)),
                filter("p"),
                NodeKind::Bin(BinNode::default()),
            ],
        );

        run(&mut graph, HoistPass::Bin);
        assert_eq!(graph.parent(ids[2]), Some(root));

        run(&mut graph, HoistPass::Transforms);
        assert_eq!(graph.parent(ids[1]), Some(ids[0]));
    }

    #[test]
    fn test_optional_output_is_transparent() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let ids = chain(
            &mut graph,
            root,
            vec![NodeKind::Output(OutputNode::new("raw", false)), filter("p")],
        );

        run(&mut graph, HoistPass::Transforms);
        assert_eq!(graph.children(root), &[ids[1]]);
    }

    #[test]
    fn test_aggregate_stops_at_content_nodes() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let ids = chain(
            &mut graph,
            root,
            vec![
                null_filter(true),
                NodeKind::Output(OutputNode::new("raw", false)),
                count_by("x"),
            ],
        );

        run(&mut graph, HoistPass::Aggregate);
        assert_eq!(graph.parent(ids[2]), Some(ids[0]));
    }

    #[test]
    fn test_aggregate_passes_vacuous_null_filter() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let ids = chain(&mut graph, root, vec![null_filter(false), count_by("x")]);

        run(&mut graph, HoistPass::Aggregate);
        assert_eq!(graph.children(root), &[ids[1]]);
    }

    #[test]
    fn test_aggregates_merge() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let ids = chain(&mut graph, root, vec![count_by("x"), count_by("y")]);

        run(&mut graph, HoistPass::Aggregate);
        assert!(!graph.is_attached(ids[1]));
        match graph.kind(ids[0]) {
            NodeKind::Aggregate(aggregate) => assert_eq!(aggregate.dimensions, vec!["x", "y"]),
            other => panic!("expected aggregate, got {:?}", other),
        }
    }

    fn facet_graph() -> (DataflowGraph, NodeId, NodeId, NodeId) {
        facet_graph_with(count_by("x"))
    }

    fn facet_graph_with(leaf: NodeKind) -> (DataflowGraph, NodeId, NodeId, NodeId) {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let ids = chain(
            &mut graph,
            root,
            vec![
                NodeKind::Output(OutputNode::new("main", true)),
                NodeKind::Facet(FacetNode {
                    name: "facet".to_string(),
                    groupby: vec!["row_field".to_string()],
                    source: None,
                }),
                leaf,
            ],
        );
        (graph, ids[0], ids[1], ids[2])
    }

    #[test]
    fn test_aggregate_folds_facet_fields() {
        let (mut graph, main, facet, aggregate) = facet_graph();

        run(&mut graph, HoistPass::Aggregate);

        assert_eq!(graph.children(main), &[aggregate]);
        assert_eq!(graph.children(aggregate), &[facet]);
        match graph.kind(aggregate) {
            NodeKind::Aggregate(node) => assert_eq!(node.dimensions, vec!["x", "row_field"]),
            other => panic!("expected aggregate, got {:?}", other),
        }
    }

    #[test]
    fn test_keep_partitioned_policy() {
        let (mut graph, _, facet, aggregate) = facet_graph();

        HoistPass::Aggregate
            .run(&mut graph, FacetHoistPolicy::KeepPartitioned, 32)
            .unwrap();

        assert_eq!(graph.parent(aggregate), Some(facet));
        match graph.kind(aggregate) {
            NodeKind::Aggregate(node) => assert_eq!(node.dimensions, vec!["x"]),
            other => panic!("expected aggregate, got {:?}", other),
        }
    }

    #[test]
    fn test_stack_folds_facet_fields() {
        let (mut graph, main, facet, stack) = facet_graph_with(stack_by("x"));

        run(&mut graph, HoistPass::Stack);

        assert_eq!(graph.children(main), &[stack]);
        assert_eq!(graph.children(stack), &[facet]);
        match graph.kind(stack) {
            NodeKind::Stack(node) => assert_eq!(node.groupby, vec!["x", "row_field"]),
            other => panic!("expected stack, got {:?}", other),
        }
    }

    #[test]
    fn test_stack_kept_partitioned() {
        let (mut graph, _, facet, stack) = facet_graph_with(stack_by("x"));

        HoistPass::Stack
            .run(&mut graph, FacetHoistPolicy::KeepPartitioned, 32)
            .unwrap();

        assert_eq!(graph.parent(stack), Some(facet));
        match graph.kind(stack) {
            NodeKind::Stack(node) => assert_eq!(node.groupby, vec!["x"]),
            other => panic!("expected stack, got {:?}", other),
        }
    }

    #[test]
    fn test_fan_out_blocks_swap() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let main = graph
            .add_child(root, NodeKind::Output(OutputNode::new("main", false)))
            .unwrap();
        let left = graph.add_child(main, filter("l")).unwrap();
        graph.add_child(main, filter("r")).unwrap();

        run(&mut graph, HoistPass::Transforms);
        assert_eq!(graph.parent(left), Some(main));
    }

    #[test]
    fn test_parse_relocates_past_fan_out() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let main = graph
            .add_child(root, NodeKind::Output(OutputNode::new("main", true)))
            .unwrap();
        let left = chain(&mut graph, main, vec![parse("a"), filter("l")]);
        let right = chain(&mut graph, main, vec![parse("b"), filter("r")]);

        run(&mut graph, HoistPass::Parse);

        assert_eq!(graph.children(root), &[main, left[0]]);
        assert_eq!(graph.children(main), &[left[1], right[1]]);
        assert!(!graph.is_attached(right[0]));
        match graph.kind(left[0]) {
            NodeKind::Parse(node) => assert_eq!(node.fields(), vec!["a", "b"]),
            other => panic!("expected parse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_passes_calculate() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        let ids = chain(&mut graph, root, vec![calculate("c"), parse("a")]);

        run(&mut graph, HoistPass::Parse);
        assert_eq!(graph.children(root), &[ids[1]]);
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let mut graph = DataflowGraph::new();
        let root = source(&mut graph);
        chain(&mut graph, root, vec![filter("p1"), filter("p2")]);

        let result = HoistPass::Transforms.run(&mut graph, FacetHoistPolicy::FoldGroupby, 1);
        assert!(matches!(
            result,
            Err(CompileError::OptimizerDidNotConverge { ref pass, iterations: 1 }) if pass == "transforms"
        ));
    }
}
