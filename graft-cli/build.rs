//! Build script for graft-cli.
//!
//! Generates the man page at build time using clap_mangen and places it in
//! OUT_DIR for inclusion in release builds.
//!
//! The command structure is rebuilt here rather than imported, since build
//! scripts cannot depend on the crate being built.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// Keep in sync with src/cli.rs.
fn build_cli() -> Command {
    Command::new("graft")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Import existing infrastructure objects and generate their configuration")
        .long_about(
            "Binds existing remote objects to tracked state and writes configuration \
             blocks that match what was imported",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .help("Read the user configuration from this directory instead of ~/.graft")
                .value_name("PATH")
                .global(true)
                .env("GRAFT_CONFIG_DIR"),
        )
        .arg(
            Arg::new("declarations")
                .long("declarations")
                .help("Declarations document listing the objects to import")
                .value_name("PATH")
                .global(true),
        )
        .subcommands(vec![
            Command::new("plan")
                .about("Show the import plan without changing anything")
                .long_about("Compare declared imports with tracked state and print the resulting plan"),
            Command::new("apply")
                .about("Import declared objects and generate their configuration")
                .long_about(
                    "Bind each missing instance to its remote object, then append generated \
                     configuration for resources that have none",
                ),
            Command::new("generate")
                .about("Generate configuration for a resource already in state")
                .long_about("Synthesize a resource block from the recorded state of its instances"),
            Command::new("validate")
                .about("Validate a declarations document")
                .long_about("Check a declarations document for malformed addresses and ids"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("graft.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
