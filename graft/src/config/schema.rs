//! Configuration schema definitions.
//!
//! This module defines the configuration structure for graft: where the
//! declarations, state and provider schemas come from, how instances are
//! bound, and where generated configuration is written.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::external::DocumentOrigin;

/// Complete configuration structure.
///
/// Every field is optional so partial configurations from several files
/// can be merged. [`crate::config::ConfigBuilder`] fills in the defaults.
///
/// # Examples
///
/// ```
/// use graft::config::{Config, SourceConfig};
///
/// let config: Config = serde_yaml::from_str(
///     "declarations: imports.yaml\nstate:\n  file: state.json\nauto_approve: true\n",
/// )
/// .unwrap();
/// assert_eq!(config.state, Some(SourceConfig::file("state.json")));
/// assert_eq!(config.auto_approve, Some(true));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path of the declarations document.
    pub declarations: Option<PathBuf>,

    /// Where the state document comes from.
    pub state: Option<SourceConfig>,

    /// Where the provider schema document comes from.
    pub schemas: Option<SourceConfig>,

    /// Command prefix that binds an instance; the address and id are appended.
    pub import_command: Option<Vec<String>>,

    /// Destination file naming.
    pub files: Option<FileConfig>,

    /// Output format for plan listings.
    pub output_format: Option<OutputFormat>,

    /// Apply plans without asking for confirmation.
    pub auto_approve: Option<bool>,
}

/// A JSON document read from a file or from a command's output.
///
/// Exactly one of `file` and `command` must be set.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Read the document from this file.
    pub file: Option<PathBuf>,

    /// Read the document from this command's standard output.
    pub command: Option<Vec<String>>,
}

impl SourceConfig {
    /// A file source.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            command: None,
        }
    }

    /// A command source.
    #[must_use]
    pub fn command<S: Into<String>>(argv: impl IntoIterator<Item = S>) -> Self {
        Self {
            file: None,
            command: Some(argv.into_iter().map(Into::into).collect()),
        }
    }

    /// The origin this source reads from, preferring the file.
    #[must_use]
    pub fn origin(&self) -> Option<DocumentOrigin> {
        match (&self.file, &self.command) {
            (Some(path), _) => Some(DocumentOrigin::File(path.clone())),
            (None, Some(argv)) => Some(DocumentOrigin::Command(argv.clone())),
            (None, None) => None,
        }
    }
}

/// How destination files for generated configuration are named.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// File used when a target has no recognized source file.
    pub default_filename: Option<PathBuf>,

    /// Suffix of declaration source files, such as `.tfy`.
    pub source_suffix: Option<String>,

    /// Suffix that replaces the source suffix, such as `.tf`.
    pub config_suffix: Option<String>,
}

/// Output format for plan listings.
///
/// # Examples
///
/// ```
/// use graft::config::OutputFormat;
///
/// let format = OutputFormat::Json;
/// assert_eq!(format.to_string(), "json");
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output format.
    Json,
    /// CSV output format.
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
