//! Optimization module
//!
//! Bottom-up hoisting passes that move nodes toward their source and merge
//! neighbours of the same kind, followed by one top-down pass removing nodes
//! that no longer do anything.

pub mod dead_node_elimination;
pub mod hoisting;

pub use dead_node_elimination::DeadNodeEliminator;
pub use hoisting::{HoistPass, PASS_ORDER};

use crate::compiler::{CompilerOptions, FacetHoistPolicy};
use crate::dataflow::DataflowGraph;
use crate::error::Result;

/// Default bound on the iterations of one hoisting pass
pub const DEFAULT_MAX_PASS_ITERATIONS: usize = 32;

/// Dataflow optimizer
#[derive(Debug, Clone)]
pub struct DataflowOptimizer {
    facet_hoist_policy: FacetHoistPolicy,
    max_pass_iterations: usize,
    dead_node_eliminator: DeadNodeEliminator,
}

impl DataflowOptimizer {
    /// Create an optimizer with default settings
    pub fn new() -> Self {
        Self::from_options(&CompilerOptions::default())
    }

    /// Create an optimizer from compiler options
    pub fn from_options(options: &CompilerOptions) -> Self {
        Self {
            facet_hoist_policy: options.facet_hoist_policy,
            max_pass_iterations: options.max_pass_iterations.max(1),
            dead_node_eliminator: DeadNodeEliminator::new(),
        }
    }

    pub fn facet_hoist_policy(&self) -> FacetHoistPolicy {
        self.facet_hoist_policy
    }

    /// Run every hoisting pass, in order, each to a fixed point
    pub fn hoist(&self, graph: &mut DataflowGraph) -> Result<()> {
        for pass in PASS_ORDER {
            let iterations =
                pass.run(graph, self.facet_hoist_policy, self.max_pass_iterations)?;
            log::trace!("Pass '{}' settled after {} iteration(s)", pass, iterations);
        }
        Ok(())
    }

    /// Run only the parse pass, so every parse ends up next to its source
    pub fn place_parses(&self, graph: &mut DataflowGraph) -> Result<()> {
        let iterations =
            HoistPass::Parse.run(graph, self.facet_hoist_policy, self.max_pass_iterations)?;
        log::trace!("Parse placement settled after {} iteration(s)", iterations);
        Ok(())
    }

    /// Remove vacuous filters and outputs nobody requires
    pub fn eliminate_dead_nodes(&self, graph: &mut DataflowGraph) -> Result<usize> {
        self.dead_node_eliminator.eliminate(graph)
    }

    /// Run all optimizations
    pub fn optimize(&self, graph: &mut DataflowGraph) -> Result<()> {
        self.hoist(graph)?;
        let removed = self.eliminate_dead_nodes(graph)?;
        log::debug!("Removed {} dead node(s)", removed);
        Ok(())
    }
}

impl Default for DataflowOptimizer {
    fn default() -> Self {
        Self::new()
    }
}
