//! Generate command implementation.
//!
//! Synthesizes the configuration block for a resource whose instances are
//! already tracked in state, and prints it or appends it to a file.

use crate::error::CliError;
use crate::utils::{load_configuration, load_schemas, load_state, GlobalOptions};
use clap::Args;
use graft::external::{ConfigSink, FileSink};
use graft::output::render_block;
use graft::state::StateSource;
use graft::{generate_resource_block, Error, RepeatMode, ResourceAddress, ResourceMode, SchemaSource};
use std::path::PathBuf;

/// Generate configuration for a resource already in state.
#[derive(Args)]
pub struct GenerateCommand {
    /// Resource address, such as aws_instance.web
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Append the block to this file instead of printing it
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl GenerateCommand {
    /// Execute the generate command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let address: ResourceAddress = self
            .address
            .parse()
            .map_err(|e: Error| CliError::InvalidArguments(e.to_string()))?;
        if address.mode == ResourceMode::Data {
            return Err(CliError::InvalidArguments(format!(
                "{address} is a data resource; configuration is only generated for managed resources"
            )));
        }

        let config = load_configuration(global)?;
        let state = load_state(&config)?;

        let views = state.instances_of(&address);
        let Some(first) = views.first() else {
            return Err(CliError::SemanticFailure(format!(
                "{address} has no instances in state"
            )));
        };
        let repeat_mode = RepeatMode::of_key(&first.address.key);
        let provider = first.provider.clone();

        let schemas = load_schemas(&config)?;
        let schema = schemas
            .schema_for(&provider, &address.resource_type)
            .ok_or_else(|| Error::SchemaNotFound {
                provider: provider.clone(),
                resource_type: address.resource_type.clone(),
            })?;

        let generated = generate_resource_block(&address, repeat_mode, schema, &views)?;
        for warning in &generated.warnings {
            log::warn!("{warning}");
        }

        match self.output {
            Some(filename) => {
                FileSink::new()
                    .with_base_dir(&config.working_dir)
                    .append(&filename, &generated.block)
                    .map_err(|source| Error::AppendFailed {
                        filename: filename.clone(),
                        source,
                    })?;
                if !global.quiet {
                    println!("Added a new {address} block to {}", filename.display());
                }
            }
            None => print!("{}", render_block(&generated.block)),
        }

        Ok(())
    }
}
