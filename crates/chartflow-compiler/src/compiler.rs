//! Main compiler
//!
//! Runs analysis, dataflow construction, optimization and assembly for a
//! resolved model tree.

use crate::builder::DataflowBuilder;
use crate::codegen::DatasetAssembler;
use crate::dataflow::DataflowGraph;
use crate::error::Result;
use crate::optimizer::{DataflowOptimizer, DEFAULT_MAX_PASS_ITERATIONS};
use crate::semantic::ModelAnalyzer;
use chartflow_core::{CompiledData, ResolvedModel};
use serde::{Deserialize, Serialize};

/// What hoisting does with an aggregate or stack directly below a facet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetHoistPolicy {
    /// Move it above the facet, adding the facet fields to its group-by
    #[default]
    FoldGroupby,
    /// Leave it inside the facet, computed per partition
    KeepPartitioned,
}

/// Compiler options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Enable model validation before building the dataflow
    pub enable_semantic_analysis: bool,
    /// Enable the hoisting passes
    pub enable_optimization: bool,
    pub facet_hoist_policy: FacetHoistPolicy,
    /// Bound on the iterations of one hoisting pass, at least 1
    pub max_pass_iterations: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            enable_semantic_analysis: true,
            enable_optimization: true,
            facet_hoist_policy: FacetHoistPolicy::default(),
            max_pass_iterations: DEFAULT_MAX_PASS_ITERATIONS,
        }
    }
}

/// The chartflow compiler
pub struct Compiler {
    options: CompilerOptions,
    semantic_analyzer: ModelAnalyzer,
    optimizer: DataflowOptimizer,
    assembler: DatasetAssembler,
}

impl Compiler {
    /// Create a new compiler instance with default options
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default())
    }

    /// Create a new compiler instance with custom options
    pub fn with_options(options: CompilerOptions) -> Self {
        let optimizer = DataflowOptimizer::from_options(&options);
        Self {
            options,
            semantic_analyzer: ModelAnalyzer::new(),
            optimizer,
            assembler: DatasetAssembler::new(),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Validate the model and build its unoptimized dataflow
    pub fn build_graph(&mut self, model: &ResolvedModel) -> Result<DataflowGraph> {
        if self.options.enable_semantic_analysis {
            self.semantic_analyzer.analyze(model)?;
        }

        let mut builder = DataflowBuilder::new();
        builder.build(model)?;
        Ok(builder.into_graph())
    }

    /// Rewrite a graph in place.
    ///
    /// With optimization disabled, parse nodes are still moved to their
    /// source and dead nodes are still removed. The assembler accepts neither
    /// a parse below other nodes nor outputs nobody requested.
    pub fn optimize(&self, graph: &mut DataflowGraph) -> Result<()> {
        if self.options.enable_optimization {
            self.optimizer.hoist(graph)?;
        } else {
            self.optimizer.place_parses(graph)?;
        }
        let removed = self.optimizer.eliminate_dead_nodes(graph)?;
        log::debug!("Removed {} dead node(s)", removed);
        Ok(())
    }

    /// Compile a resolved model into dataset records
    pub fn compile(&mut self, model: &ResolvedModel) -> Result<CompiledData> {
        let mut graph = self.build_graph(model)?;
        log::debug!(
            "Built dataflow for '{}' with {} node(s)",
            model.name,
            graph.len()
        );

        self.optimize(&mut graph)?;
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Optimized dataflow:\n{}", graph.render_tree());
        }

        let compiled = self.assembler.assemble(&mut graph)?;
        log::info!(
            "Compiled '{}' into {} dataset(s) and {} facet(s)",
            model.name,
            compiled.datasets.len(),
            compiled.facets.len()
        );
        Ok(compiled)
    }

    /// Get a reference to the semantic analyzer
    pub fn semantic_analyzer(&self) -> &ModelAnalyzer {
        &self.semantic_analyzer
    }

    /// Get a reference to the optimizer
    pub fn optimizer(&self) -> &DataflowOptimizer {
        &self.optimizer
    }

    /// Get a reference to the assembler
    pub fn assembler(&self) -> &DatasetAssembler {
        &self.assembler
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
