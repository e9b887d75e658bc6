//! Utility functions for CLI operations.
//!
//! This module provides helpers shared across commands: loading the layered
//! configuration, reading the declarations, state and schema documents it
//! points at, and building the import plan.

use crate::error::CliError;
use graft::config::{Config, ConfigBuilder, ResolvedConfig};
use graft::operations::ImportPlanBuilder;
use graft::state::StateSource;
use graft::{Declarations, ImportPlan, ProviderSchemaCatalog, StateSnapshot};
use std::path::PathBuf;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)] // verbose is only read in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the user configuration directory.
    pub config_dir: Option<PathBuf>,

    /// Override the declarations document.
    pub declarations: Option<PathBuf>,
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Global options (highest priority)
/// 2. Environment variables
/// 3. Configuration files
/// 4. Built-in defaults (lowest priority)
pub fn load_configuration(global: &GlobalOptions) -> Result<ResolvedConfig, CliError> {
    let mut builder = ConfigBuilder::new();

    if let Some(ref dir) = global.config_dir {
        builder = builder.with_config_dir(dir);
    }

    if let Some(ref path) = global.declarations {
        builder = builder.with_config(Config {
            declarations: Some(path.clone()),
            ..Default::default()
        });
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

/// Load the declarations document named by the configuration.
pub fn load_declarations(config: &ResolvedConfig) -> Result<Declarations, CliError> {
    Declarations::load(&config.declarations).map_err(CliError::from)
}

/// Read tracked state from its configured origin.
pub fn load_state(config: &ResolvedConfig) -> Result<StateSnapshot, CliError> {
    StateSnapshot::load(config.state.clone()).map_err(CliError::from)
}

/// Read provider schemas from their configured origin.
pub fn load_schemas(config: &ResolvedConfig) -> Result<ProviderSchemaCatalog, CliError> {
    ProviderSchemaCatalog::load(&config.schemas).map_err(CliError::from)
}

/// Build the sorted import plan for the declarations against tracked state.
///
/// Every target that cannot be planned is reported on stderr, and any such
/// target fails the whole command so nothing is imported from a partial
/// plan.
pub fn plan_imports(
    config: &ResolvedConfig,
    declarations: &Declarations,
    state: &StateSnapshot,
) -> Result<ImportPlan, CliError> {
    let (plan, errors) = ImportPlanBuilder::new(declarations.targets.clone())
        .with_filename_policy(config.filename_policy.clone())
        .build_plan(&state.current_instances(), &declarations.declared);

    if !errors.is_empty() {
        for error in &errors {
            eprintln!("Error: {error}");
        }
        return Err(CliError::SemanticFailure(format!(
            "{} import target(s) in {} could not be planned",
            errors.len(),
            config.declarations.display()
        )));
    }

    for warning in &plan.warnings {
        log::warn!("{warning}");
    }

    Ok(plan)
}

/// Quote a word for display in a POSIX shell command line.
pub fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', "'\\''"))
}
