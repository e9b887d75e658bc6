//! Main entry point for the graft CLI.
//!
//! This is the command-line interface for importing existing infrastructure
//! objects. It provides commands for:
//! - `plan`: Show which instances would be imported and which blocks generated
//! - `apply`: Import declared objects and generate their configuration
//! - `generate`: Generate configuration for a resource already in state
//! - `validate`: Check a declarations document

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    graft::init_logger(cli.verbose, cli.quiet).install();

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_dir: cli.config_dir,
        declarations: cli.declarations,
    };

    let result = match cli.command {
        cli::Command::Plan(cmd) => cmd.execute(&global),
        cli::Command::Apply(cmd) => cmd.execute(&global),
        cli::Command::Generate(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
