//! Chartflow command line
//!
//! Compiles a resolved model file into dataset records.

mod config;

use crate::config::CliConfig;
use anyhow::{Context, Result};
use chartflow_compiler::Compiler;
use chartflow_parser::ModelParser;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "chartflow", version, about = "Compile resolved chart models into dataset pipelines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a model and print the dataset records as JSON
    Compile {
        /// Model file (.yaml, .yml or .json)
        model: PathBuf,

        #[command(flatten)]
        options: RunOptions,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print the optimized dataflow tree of a model
    Graph {
        /// Model file (.yaml, .yml or .json)
        model: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(Debug, clap::Args)]
struct RunOptions {
    /// Configuration file (YAML, JSON or TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the hoisting passes
    #[arg(long)]
    no_optimize: bool,
}

impl RunOptions {
    fn load(&self) -> Result<CliConfig> {
        let mut config = CliConfig::load(self.config.as_deref())?;
        if self.no_optimize {
            config.compiler.enable_optimization = false;
        }
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Compile {
            model,
            options,
            compact,
        } => {
            let config = options.load()?;
            let output = compile(&model, &config, compact)?;
            println!("{}", output);
        }
        Command::Graph { model, options } => {
            let config = options.load()?;
            print!("{}", render_graph(&model, &config)?);
        }
    }

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chartflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

fn compile(path: &Path, config: &CliConfig, compact: bool) -> Result<String> {
    let model = ModelParser::from_file(path)
        .with_context(|| format!("Failed to load model {}", path.display()))?;

    let mut compiler = Compiler::with_options(config.compiler.clone());
    let compiled = compiler
        .compile(&model)
        .with_context(|| format!("Failed to compile {}", path.display()))?;
    info!(
        "Compiled {} into {} dataset(s)",
        path.display(),
        compiled.datasets.len()
    );

    let json = if compact || !config.pretty {
        serde_json::to_string(&compiled)?
    } else {
        serde_json::to_string_pretty(&compiled)?
    };
    Ok(json)
}

fn render_graph(path: &Path, config: &CliConfig) -> Result<String> {
    let model = ModelParser::from_file(path)
        .with_context(|| format!("Failed to load model {}", path.display()))?;

    let mut compiler = Compiler::with_options(config.compiler.clone());
    let mut graph = compiler
        .build_graph(&model)
        .with_context(|| format!("Failed to build dataflow for {}", path.display()))?;
    compiler.optimize(&mut graph)?;
    Ok(graph.render_tree())
}
