//! Collaborators at the edge of the core.
//!
//! The planner and synthesis engine never touch processes or files
//! themselves. Binding an instance to a remote object goes through a
//! [`Binder`], writing generated configuration goes through a
//! [`ConfigSink`], and state and schema documents are read from a
//! [`DocumentOrigin`].

pub mod command;
pub mod file;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::address::InstanceAddress;
use crate::error::{CollaboratorError, Result};
use crate::synthesis::Block;

pub use command::{run_command, CommandBinder};
pub use file::FileSink;

/// Binds a tracked instance address to an existing remote object.
#[cfg_attr(test, mockall::automock)]
pub trait Binder {
    /// Starts tracking the remote object `id` as `target`.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error if the object could not be bound.
    fn bind(&mut self, target: &InstanceAddress, id: &str) -> std::result::Result<(), CollaboratorError>;
}

/// Appends generated configuration blocks to files.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigSink {
    /// Appends `block` to `filename`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error if the file could not be updated.
    fn append(&mut self, filename: &Path, block: &Block) -> std::result::Result<(), CollaboratorError>;
}

/// Where a JSON document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// A file on disk.
    File(PathBuf),
    /// The standard output of a command, given as program and arguments.
    Command(Vec<String>),
}

impl DocumentOrigin {
    /// Reads the document.
    ///
    /// Returns `Ok(None)` when a file origin does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the command fails.
    pub fn read(&self) -> Result<Option<String>> {
        match self {
            Self::File(path) => {
                if !path.exists() {
                    return Ok(None);
                }
                Ok(Some(fs::read_to_string(path)?))
            }
            Self::Command(argv) => run_command(argv, None).map(Some),
        }
    }
}

impl fmt::Display for DocumentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Command(argv) => write!(f, "`{}`", argv.join(" ")),
        }
    }
}
