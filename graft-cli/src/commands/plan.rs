//! Plan command implementation.
//!
//! This module implements the `plan` command, which builds the import plan
//! for the declared targets and prints it as a table, JSON or CSV without
//! changing anything.

use crate::error::CliError;
use crate::utils::{load_configuration, load_declarations, load_state, plan_imports, GlobalOptions};
use clap::{Args, ValueEnum};
use graft::config::OutputFormat;
use graft::ImportPlan;
use std::io::Write;

/// Column headers for table and CSV output.
const COLUMN_HEADERS: [&str; 5] = ["action", "target", "id", "repeat_mode", "filename"];

/// Show the import plan without changing anything.
#[derive(Args)]
pub struct PlanCommand {
    /// Output format (defaults to the configured output format)
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<PlanFormat>,
}

/// Output format for the plan command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum PlanFormat {
    /// Tab-separated table format (human-readable)
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl From<OutputFormat> for PlanFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => Self::Table,
            OutputFormat::Json => Self::Json,
            OutputFormat::Csv => Self::Csv,
        }
    }
}

impl PlanCommand {
    /// Execute the plan command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let declarations = load_declarations(&config)?;
        let state = load_state(&config)?;
        let plan = plan_imports(&config, &declarations, &state)?;

        let format = self.format.unwrap_or_else(|| config.output_format.into());
        match format {
            PlanFormat::Table => format_as_table(&plan, global.quiet)?,
            PlanFormat::Json => format_as_json(&plan)?,
            PlanFormat::Csv => format_as_csv(&plan)?,
        }

        Ok(())
    }
}

/// One output row per plan action, in execution order.
fn plan_rows(plan: &ImportPlan) -> Vec<[String; 5]> {
    let bindings = plan.state_bindings.iter().map(|binding| {
        [
            "import".to_string(),
            binding.target.to_string(),
            binding.id.clone(),
            String::new(),
            String::new(),
        ]
    });
    let stubs = plan.config_stubs.iter().map(|stub| {
        [
            "generate".to_string(),
            stub.target.to_string(),
            String::new(),
            stub.repeat_mode.to_string(),
            stub.filename.display().to_string(),
        ]
    });
    bindings.chain(stubs).collect()
}

/// Format the plan as a human-readable table.
fn format_as_table(plan: &ImportPlan, quiet: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    if plan.is_empty() {
        if !quiet {
            writeln!(handle, "Nothing to do! Everything declared is already imported.")?;
        }
        return Ok(());
    }

    let header_line = COLUMN_HEADERS
        .iter()
        .map(|s| s.to_uppercase())
        .collect::<Vec<_>>()
        .join("\t");
    writeln!(handle, "{header_line}")?;

    for row in plan_rows(plan) {
        let cells: Vec<&str> = row
            .iter()
            .map(|cell| if cell.is_empty() { "-" } else { cell.as_str() })
            .collect();
        writeln!(handle, "{}", cells.join("\t"))?;
    }

    Ok(())
}

/// Format the plan as JSON.
fn format_as_json(plan: &ImportPlan) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let bindings: Vec<serde_json::Value> = plan
        .state_bindings
        .iter()
        .map(|b| {
            serde_json::json!({
                "target": b.target.to_string(),
                "id": b.id,
            })
        })
        .collect();

    let stubs: Vec<serde_json::Value> = plan
        .config_stubs
        .iter()
        .map(|s| {
            serde_json::json!({
                "target": s.target.to_string(),
                "repeat_mode": s.repeat_mode.to_string(),
                "filename": s.filename.display().to_string(),
                "provider": s.provider,
            })
        })
        .collect();

    let json_data = serde_json::json!({
        "state_bindings": bindings,
        "config_stubs": stubs,
        "warnings": plan.warnings,
    });

    serde_json::to_writer_pretty(&mut handle, &json_data)
        .map_err(|e| CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    writeln!(handle)?;

    Ok(())
}

/// Convert csv::Error to CliError.
fn csv_error(e: csv::Error) -> CliError {
    CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Format the plan as CSV.
fn format_as_csv(plan: &ImportPlan) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let handle = stdout.lock();
    let mut writer = csv::WriterBuilder::new().from_writer(handle);

    writer.write_record(COLUMN_HEADERS).map_err(csv_error)?;
    for row in plan_rows(plan) {
        writer.write_record(&row).map_err(csv_error)?;
    }

    writer.flush()?;

    Ok(())
}
