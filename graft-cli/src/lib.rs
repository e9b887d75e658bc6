//! Library exports for graft-cli.
//!
//! Exposes the CLI structure so completions and documentation can be
//! generated from it.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
