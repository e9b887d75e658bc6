//! Configuration validation.
//!
//! Checks a merged configuration for values that would only fail later,
//! such as empty commands or document sources naming both a file and a
//! command.

use crate::config::schema::{Config, FileConfig, SourceConfig};
use crate::error::{Error, Result};

/// Validates configuration.
///
/// # Examples
///
/// ```
/// use graft::config::{Config, ConfigValidator, SourceConfig};
///
/// ConfigValidator::validate(&Config::default()).unwrap();
///
/// let config = Config {
///     state: Some(SourceConfig { file: None, command: Some(vec![]) }),
///     ..Default::default()
/// };
/// assert!(ConfigValidator::validate(&config).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref declarations) = config.declarations {
            if declarations.as_os_str().is_empty() {
                return Err(Error::Validation {
                    field: "declarations".into(),
                    message: "Path cannot be empty".into(),
                });
            }
        }

        if let Some(ref state) = config.state {
            Self::validate_source("state", state)?;
        }

        if let Some(ref schemas) = config.schemas {
            Self::validate_source("schemas", schemas)?;
        }

        if let Some(ref command) = config.import_command {
            Self::validate_command("import_command", command)?;
        }

        if let Some(ref files) = config.files {
            Self::validate_files(files)?;
        }

        Ok(())
    }

    /// A source names exactly one of a file and a non-empty command.
    fn validate_source(field: &str, source: &SourceConfig) -> Result<()> {
        match (&source.file, &source.command) {
            (Some(_), Some(_)) => Err(Error::Validation {
                field: field.into(),
                message: "Specify either file or command, not both".into(),
            }),
            (None, None) => Err(Error::Validation {
                field: field.into(),
                message: "Specify a file or a command".into(),
            }),
            (Some(file), None) if file.as_os_str().is_empty() => Err(Error::Validation {
                field: format!("{field}.file"),
                message: "Path cannot be empty".into(),
            }),
            (Some(_), None) => Ok(()),
            (None, Some(command)) => Self::validate_command(&format!("{field}.command"), command),
        }
    }

    fn validate_command(field: &str, command: &[String]) -> Result<()> {
        match command.first() {
            None => Err(Error::Validation {
                field: field.into(),
                message: "Command cannot be empty".into(),
            }),
            Some(program) if program.trim().is_empty() => Err(Error::Validation {
                field: field.into(),
                message: "Program name cannot be empty".into(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn validate_files(files: &FileConfig) -> Result<()> {
        if let Some(ref filename) = files.default_filename {
            if filename.as_os_str().is_empty() {
                return Err(Error::Validation {
                    field: "files.default_filename".into(),
                    message: "Filename cannot be empty".into(),
                });
            }
        }

        for (field, suffix) in [
            ("files.source_suffix", &files.source_suffix),
            ("files.config_suffix", &files.config_suffix),
        ] {
            if let Some(suffix) = suffix {
                if suffix.len() < 2 || !suffix.starts_with('.') {
                    return Err(Error::Validation {
                        field: field.into(),
                        message: format!("Suffix must start with '.' and name an extension, got '{suffix}'"),
                    });
                }
            }
        }

        Ok(())
    }
}
