//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `plan`: Show the import plan
//! - `apply`: Import declared objects and generate their configuration
//! - `generate`: Generate configuration for a resource already in state
//! - `validate`: Validate a declarations document
//! - `completions`: Generate shell completion scripts

pub mod apply;
pub mod completions;
pub mod generate;
pub mod plan;
pub mod validate;

pub use apply::ApplyCommand;
pub use completions::CompletionsCommand;
pub use generate::GenerateCommand;
pub use plan::PlanCommand;
pub use validate::ValidateCommand;
