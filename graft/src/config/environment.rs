//! Environment variable handling for configuration overrides.
//!
//! `GRAFT_*` variables override values from configuration files. Commands
//! given through the environment are split on whitespace.

use std::env;
use std::path::PathBuf;

use crate::config::schema::{Config, OutputFormat, SourceConfig};
use crate::error::{Error, Result};

/// Overrides the declarations path.
pub const DECLARATIONS: &str = "GRAFT_DECLARATIONS";
/// Reads state from a file.
pub const STATE_FILE: &str = "GRAFT_STATE_FILE";
/// Reads state from a command.
pub const STATE_COMMAND: &str = "GRAFT_STATE_COMMAND";
/// Reads provider schemas from a file.
pub const SCHEMA_FILE: &str = "GRAFT_SCHEMA_FILE";
/// Reads provider schemas from a command.
pub const SCHEMA_COMMAND: &str = "GRAFT_SCHEMA_COMMAND";
/// Overrides the import command prefix.
pub const IMPORT_COMMAND: &str = "GRAFT_IMPORT_COMMAND";
/// Overrides the default destination file.
pub const DEFAULT_FILENAME: &str = "GRAFT_DEFAULT_FILENAME";
/// Overrides the plan output format.
pub const OUTPUT_FORMAT: &str = "GRAFT_OUTPUT_FORMAT";
/// Skips the apply confirmation.
pub const AUTO_APPROVE: &str = "GRAFT_AUTO_APPROVE";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```
/// use graft::config::{Config, EnvironmentConfig, OutputFormat};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_from(&mut config, |name| {
///     (name == "GRAFT_OUTPUT_FORMAT").then(|| "json".to_string())
/// })
/// .unwrap();
/// assert_eq!(config.output_format, Some(OutputFormat::Json));
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value, such as an
    /// unknown output format or an unparseable boolean.
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        Self::apply_from(config, |name| env::var(name).ok())
    }

    /// Apply overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn apply_from<F>(config: &mut Config, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DECLARATIONS) {
            config.declarations = Some(PathBuf::from(path));
        }

        if let Some(source) = Self::source_override(&lookup, STATE_FILE, STATE_COMMAND)? {
            config.state = Some(source);
        }

        if let Some(source) = Self::source_override(&lookup, SCHEMA_FILE, SCHEMA_COMMAND)? {
            config.schemas = Some(source);
        }

        if let Some(command) = lookup(IMPORT_COMMAND) {
            config.import_command = Some(Self::split_command(IMPORT_COMMAND, &command)?);
        }

        if let Some(filename) = lookup(DEFAULT_FILENAME) {
            let files = config.files.get_or_insert_with(Default::default);
            files.default_filename = Some(PathBuf::from(filename));
        }

        if let Some(format) = lookup(OUTPUT_FORMAT) {
            config.output_format = Some(Self::parse_format(OUTPUT_FORMAT, &format)?);
        }

        if let Some(val) = lookup(AUTO_APPROVE) {
            config.auto_approve = Some(Self::parse_bool(AUTO_APPROVE, &val)?);
        }

        Ok(())
    }

    /// A document source from a file variable or a command variable.
    ///
    /// Setting both is an error rather than a silent preference.
    fn source_override<F>(lookup: &F, file_var: &str, command_var: &str) -> Result<Option<SourceConfig>>
    where
        F: Fn(&str) -> Option<String>,
    {
        match (lookup(file_var), lookup(command_var)) {
            (Some(_), Some(_)) => Err(Error::Validation {
                field: file_var.into(),
                message: format!("Cannot be combined with {command_var}"),
            }),
            (Some(file), None) => Ok(Some(SourceConfig::file(file))),
            (None, Some(command)) => Ok(Some(SourceConfig::command(Self::split_command(
                command_var,
                &command,
            )?))),
            (None, None) => Ok(None),
        }
    }

    fn split_command(field: &str, s: &str) -> Result<Vec<String>> {
        let argv: Vec<String> = s.split_whitespace().map(str::to_string).collect();
        if argv.is_empty() {
            return Err(Error::Validation {
                field: field.into(),
                message: "Command cannot be empty".into(),
            });
        }
        Ok(argv)
    }

    fn parse_format(field: &str, s: &str) -> Result<OutputFormat> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!("Invalid output format: '{s}' (expected table/json/csv)"),
            }),
        }
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts true/false, 1/0, yes/no and on/off in any case.
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }
}
