//! Dataset assembler
//!
//! Walks the optimized forest depth first, accumulating transform steps
//! into a pending record. A record is emitted whenever the flow forks, ends,
//! or reaches a node other components refer to by name. Facet subtrees are
//! assembled after the main trees into per-partition dataset lists.

use crate::dataflow::{DataflowGraph, NodeId, NodeKind};
use crate::error::{CompileError, Result};
use chartflow_core::{CompiledData, DatasetRecord, FacetData, TransformStep};
use std::collections::{HashMap, VecDeque};

/// Record under construction: an upstream name plus steps not yet emitted
#[derive(Debug, Clone)]
struct PendingRecord {
    source: String,
    transform: Vec<TransformStep>,
}

impl PendingRecord {
    fn derived(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            transform: Vec::new(),
        }
    }
}

/// Dataset assembler
#[derive(Debug, Default)]
pub struct DatasetAssembler {
    /// Next `data_{n}` suffix
    data_index: usize,
    /// Next `source_{n}` suffix
    source_index: usize,
    /// Source node -> position of its record in the top-level list
    source_slots: HashMap<NodeId, usize>,
    /// Facet nodes waiting for their subtree to be assembled
    facet_queue: VecDeque<NodeId>,
}

impl DatasetAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble every tree of the graph.
    ///
    /// Output and facet nodes record the dataset they resolved to.
    pub fn assemble(&mut self, graph: &mut DataflowGraph) -> Result<CompiledData> {
        self.reset();

        let mut datasets = Vec::new();
        for root in graph.roots().to_vec() {
            let NodeKind::Source(source) = graph.kind(root) else {
                return Err(CompileError::InvalidGraphOperation(format!(
                    "root {} is a {}, not a source",
                    root,
                    graph.tag(root)
                )));
            };

            let name = match source.dataset_name() {
                Some(name) => name.to_string(),
                None => {
                    let name = format!("source_{}", self.source_index);
                    self.source_index += 1;
                    name
                }
            };

            self.source_slots.insert(root, datasets.len());
            datasets.push(source.assemble(&name));
            self.walk_children(graph, root, PendingRecord::derived(name), &mut datasets)?;
        }

        let mut facets = Vec::new();
        while let Some(id) = self.facet_queue.pop_front() {
            let NodeKind::Facet(facet) = graph.kind(id).clone() else {
                return Err(CompileError::InvalidGraphOperation(format!(
                    "{} was queued as a facet",
                    id
                )));
            };
            let source = facet.source.ok_or_else(|| {
                CompileError::InvalidGraphOperation(format!(
                    "facet '{}' has no source record",
                    facet.name
                ))
            })?;

            let mut records = Vec::new();
            self.walk_children(graph, id, PendingRecord::derived(facet.name.clone()), &mut records)?;
            facets.push(FacetData {
                name: facet.name,
                source,
                groupby: facet.groupby,
                datasets: records,
            });
        }

        log::debug!(
            "Assembled {} dataset(s), {} facet(s)",
            datasets.len(),
            facets.len()
        );
        Ok(CompiledData { datasets, facets })
    }

    fn reset(&mut self) {
        self.data_index = 0;
        self.source_index = 0;
        self.source_slots.clear();
        self.facet_queue.clear();
    }

    fn walk(
        &mut self,
        graph: &mut DataflowGraph,
        id: NodeId,
        mut pending: PendingRecord,
        out: &mut Vec<DatasetRecord>,
    ) -> Result<()> {
        match graph.kind(id).clone() {
            NodeKind::Source(_) => {
                return Err(CompileError::InvalidGraphOperation(format!(
                    "source {} is not a root",
                    id
                )));
            }

            NodeKind::Parse(parse) => {
                let slot = graph
                    .parent(id)
                    .and_then(|parent| self.source_slots.get(&parent))
                    .copied()
                    .ok_or_else(|| CompileError::ParseNotUnderSource {
                        fields: parse.fields().join(", "),
                    })?;
                let format = out[slot].format.get_or_insert_with(Default::default);
                let target = format.parse.get_or_insert_with(Default::default);
                // Explicit entries of the declaration win
                for (field, parse_type) in parse.assemble() {
                    target
                        .entry(field.clone())
                        .or_insert_with(|| parse_type.clone());
                }
            }

            NodeKind::Facet(_) => {
                let source = self.materialize(&mut pending, out);
                if let NodeKind::Facet(facet) = graph.kind_mut(id) {
                    facet.source = Some(source);
                }
                self.facet_queue.push_back(id);
                return Ok(());
            }

            NodeKind::FacetAggregate(node) => {
                let children = graph.children(id).len();
                if children > 0 {
                    return Err(CompileError::FacetAggregateHasChildren {
                        name: node.name,
                        children,
                    });
                }
                let mut transform = pending.transform;
                transform.push(node.assemble());
                out.push(DatasetRecord::derived(&node.name, pending.source, transform));
                if let NodeKind::FacetAggregate(facet_aggregate) = graph.kind_mut(id) {
                    facet_aggregate.resolved = Some(node.name);
                }
                return Ok(());
            }

            NodeKind::Output(node) => {
                let resolved = self.materialize(&mut pending, out);
                out.push(DatasetRecord::derived(&node.name, &resolved, Vec::new()));
                if let NodeKind::Output(output) = graph.kind_mut(id) {
                    output.resolved = Some(resolved);
                }
            }

            kind => pending.transform.extend(kind.assemble()),
        }

        self.walk_children(graph, id, pending, out)
    }

    fn walk_children(
        &mut self,
        graph: &mut DataflowGraph,
        id: NodeId,
        mut pending: PendingRecord,
        out: &mut Vec<DatasetRecord>,
    ) -> Result<()> {
        let children = graph.children(id).to_vec();
        match children.as_slice() {
            [] => {
                self.materialize(&mut pending, out);
            }
            [only] => self.walk(graph, *only, pending, out)?,
            _ => {
                let shared = self.materialize(&mut pending, out);
                for child in children {
                    self.walk(graph, child, PendingRecord::derived(shared.clone()), out)?;
                }
            }
        }
        Ok(())
    }

    /// Emit the pending steps as a `data_{n}` record, returning the name the
    /// flow continues from
    fn materialize(&mut self, pending: &mut PendingRecord, out: &mut Vec<DatasetRecord>) -> String {
        if pending.transform.is_empty() {
            return pending.source.clone();
        }

        let name = format!("data_{}", self.data_index);
        self.data_index += 1;
        let transform = std::mem::take(&mut pending.transform);
        out.push(DatasetRecord::derived(&name, &pending.source, transform));
        *pending = PendingRecord::derived(name.clone());
        name
    }
}
