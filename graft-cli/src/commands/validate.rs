//! Command to validate a declarations document.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::Args;
use graft::Declarations;
use std::path::PathBuf;

/// Validate a declarations document.
#[derive(Args)]
pub struct ValidateCommand {
    /// Declarations document to validate (defaults to the configured one)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

impl ValidateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = match self.path {
            Some(path) => path,
            None => load_configuration(global)?.declarations,
        };

        if !path.exists() {
            return Err(CliError::InvalidArguments(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let declarations = match Declarations::load(&path) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Validation error: {e}");
                return Err(CliError::SemanticFailure(
                    "Declarations file is invalid".to_string(),
                ));
            }
        };

        let mut invalid = 0;
        for target in &declarations.targets {
            if let Err(reason) = target.desired_ids.normalize() {
                eprintln!("Validation error: invalid id for {}: {reason}", target.address);
                invalid += 1;
            }
        }
        if invalid > 0 {
            return Err(CliError::SemanticFailure(format!(
                "{invalid} import target(s) have invalid ids"
            )));
        }

        println!(
            "Declarations are valid: {} import targets, {} declared resources",
            declarations.targets.len(),
            declarations.declared.len()
        );
        Ok(())
    }
}
