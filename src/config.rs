//! CLI configuration

use anyhow::Context;
use chartflow_compiler::CompilerOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one CLI run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Options handed to the compiler
    #[serde(default)]
    pub compiler: CompilerOptions,

    /// Pretty-print the compiled JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            compiler: CompilerOptions::default(),
            pretty: default_pretty(),
        }
    }
}

impl CliConfig {
    /// Load configuration from an optional file and `CHARTFLOW_*` variables.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `CHARTFLOW_COMPILER__FACET_HOIST_POLICY=keep_partitioned`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("CHARTFLOW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
