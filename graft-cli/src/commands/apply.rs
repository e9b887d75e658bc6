//! Apply command implementation.
//!
//! This module implements the `apply` command: it prints the import plan,
//! asks for confirmation, binds each missing instance by running the import
//! command, and appends generated configuration for resources that had none.

use crate::error::CliError;
use crate::utils::{
    load_configuration, load_declarations, load_schemas, load_state, plan_imports, shell_quote,
    GlobalOptions,
};
use clap::Args;
use graft::error::CollaboratorError;
use graft::external::{Binder, CommandBinder, ConfigSink, FileSink};
use graft::synthesis::Block;
use graft::{ImportExecutor, ImportPlan, InstanceAddress, ProviderSchemaCatalog};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Import declared objects and generate their configuration.
#[derive(Args)]
pub struct ApplyCommand {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub auto_approve: bool,

    /// Show the plan without importing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl ApplyCommand {
    /// Execute the apply command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let declarations = load_declarations(&config)?;
        let mut state = load_state(&config)?;
        let plan = plan_imports(&config, &declarations, &state)?;

        if plan.is_empty() {
            println!("Nothing to do! Everything declared is already imported.");
            return Ok(());
        }

        print_plan(&plan);

        let mut binder = ReportingBinder::new(
            CommandBinder::new(config.import_command.clone()).with_working_dir(&config.working_dir),
        );
        let mut sink = ReportingSink::new(FileSink::new().with_base_dir(&config.working_dir));

        if self.dry_run {
            let schemas = ProviderSchemaCatalog::new();
            let result = ImportExecutor::new(&mut binder, &mut state, &schemas, &mut sink)
                .dry_run()
                .execute(&plan)?;
            println!("\nDry run: {} actions were not executed.", result.actions_taken.len());
            return Ok(());
        }

        if !(self.auto_approve || config.auto_approve) && !confirm()? {
            println!("Cancelled.");
            return Ok(());
        }
        println!();

        let schemas = load_schemas(&config)?;

        println!("Importing:");
        let result = ImportExecutor::new(&mut binder, &mut state, &schemas, &mut sink).execute(&plan)?;
        log::info!(
            "Bound {} instances and generated {} blocks",
            result.bound.len(),
            result.generated.len()
        );

        if !global.quiet {
            println!("\nAll done! Confirm the result by trying to create a Terraform plan:");
            println!("    terraform plan\n");
        }

        Ok(())
    }
}

fn print_plan(plan: &ImportPlan) {
    println!("Import plan:");
    for binding in &plan.state_bindings {
        println!(
            "- Create Terraform state binding from {} to remote object {:?}",
            binding.target, binding.id
        );
    }
    for stub in &plan.config_stubs {
        println!(
            "- Generate a new {} configuration block in {}",
            stub.target,
            stub.filename.display()
        );
    }
}

/// Ask the user to confirm. Only the exact answer `yes` counts.
fn confirm() -> Result<bool, CliError> {
    print!("\nDo you want to proceed? (Only \"yes\" will be accepted to confirm.)\n> ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim() == "yes")
}

/// Prints each import command before running it.
struct ReportingBinder {
    inner: CommandBinder,
}

impl ReportingBinder {
    fn new(inner: CommandBinder) -> Self {
        Self { inner }
    }
}

impl Binder for ReportingBinder {
    fn bind(&mut self, target: &InstanceAddress, id: &str) -> Result<(), CollaboratorError> {
        let argv = self.inner.command_line(target, id);
        let (prefix, _) = argv.split_at(argv.len().saturating_sub(2));
        println!(
            "- {} {} {}",
            prefix.join(" "),
            shell_quote(&target.to_string()),
            shell_quote(id)
        );
        self.inner.bind(target, id)
    }
}

/// Prints each generated block's destination before appending it.
struct ReportingSink {
    inner: FileSink,
}

impl ReportingSink {
    fn new(inner: FileSink) -> Self {
        Self { inner }
    }
}

impl ConfigSink for ReportingSink {
    fn append(&mut self, filename: &Path, block: &Block) -> Result<(), CollaboratorError> {
        let labels: Vec<String> = block.labels.iter().map(|l| format!("{l:?}")).collect();
        println!(
            "- adding a new {} {} block to {}",
            block.block_type,
            labels.join(" "),
            filename.display()
        );
        self.inner.append(filename, block)
    }
}
