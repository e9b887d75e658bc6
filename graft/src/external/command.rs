//! Running external commands.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::Binder;
use crate::address::InstanceAddress;
use crate::error::{CollaboratorError, Error, Result};

/// Runs `argv` and returns its standard output.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an empty command line, [`Error::Io`] if
/// the program cannot be started, and [`Error::CommandFailed`] if it exits
/// unsuccessfully.
pub fn run_command(argv: &[String], working_dir: Option<&Path>) -> Result<String> {
    let (program, args) = argv.split_first().ok_or_else(|| Error::Validation {
        field: "command".into(),
        message: "command line is empty".into(),
    })?;

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }

    log::debug!("Running {}", argv.join(" "));
    let output = command.output()?;
    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: argv.join(" "),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Binds instances by running an import command.
///
/// The instance address and remote id are appended to the configured
/// command prefix, so the default prefix runs
/// `terraform import -allow-missing-config ADDRESS ID`.
#[derive(Debug, Clone)]
pub struct CommandBinder {
    prefix: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandBinder {
    /// Creates a binder that runs `prefix ADDRESS ID`.
    #[must_use]
    pub fn new(prefix: Vec<String>) -> Self {
        Self {
            prefix,
            working_dir: None,
        }
    }

    /// Runs the command in `dir` instead of the current directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The full command line used to bind `target` to `id`.
    #[must_use]
    pub fn command_line(&self, target: &InstanceAddress, id: &str) -> Vec<String> {
        let mut argv = self.prefix.clone();
        argv.push(target.to_string());
        argv.push(id.to_string());
        argv
    }
}

impl Binder for CommandBinder {
    fn bind(&mut self, target: &InstanceAddress, id: &str) -> std::result::Result<(), CollaboratorError> {
        let argv = self.command_line(target, id);
        log::info!("Importing {target} from {id:?}");
        run_command(&argv, self.working_dir.as_deref())?;
        Ok(())
    }
}
