//! Dead node elimination
//!
//! Removes null and non-positive filters that filter nothing and outputs no
//! component reads. Runs top-down after hoisting, when vacuous nodes have
//! been gathered next to each other.

use crate::dataflow::{DataflowGraph, NodeId};
use crate::error::Result;

/// Dead node eliminator
#[derive(Debug, Clone, Default)]
pub struct DeadNodeEliminator;

impl DeadNodeEliminator {
    /// Create a new dead node eliminator
    pub fn new() -> Self {
        Self
    }

    /// Remove every vacuous node, returning how many were removed
    pub fn eliminate(&self, graph: &mut DataflowGraph) -> Result<usize> {
        let mut removed = 0;
        for root in graph.roots().to_vec() {
            self.visit(graph, root, &mut removed)?;
        }
        Ok(removed)
    }

    fn visit(&self, graph: &mut DataflowGraph, id: NodeId, removed: &mut usize) -> Result<()> {
        // Children are captured first: removal splices them into the parent
        let children = graph.children(id).to_vec();
        if graph.kind(id).is_vacuous() {
            graph.remove(id)?;
            *removed += 1;
        }
        for child in children {
            self.visit(graph, child, removed)?;
        }
        Ok(())
    }
}
