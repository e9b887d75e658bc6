//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    ApplyCommand, CompletionsCommand, GenerateCommand, PlanCommand, ValidateCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for importing existing infrastructure objects.
#[derive(Parser)]
#[command(name = "graft")]
#[command(
    version,
    about = "Import existing infrastructure objects and generate their configuration",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Read the user configuration from this directory instead of ~/.graft
    #[arg(long, value_name = "PATH", global = true, env = "GRAFT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Declarations document listing the objects to import
    #[arg(long, value_name = "PATH", global = true)]
    pub declarations: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Show the import plan without changing anything
    Plan(PlanCommand),

    /// Import declared objects and generate their configuration
    Apply(ApplyCommand),

    /// Generate configuration for a resource already in state
    Generate(GenerateCommand),

    /// Validate a declarations document
    Validate(ValidateCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
