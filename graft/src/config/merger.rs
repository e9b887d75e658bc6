//! Configuration merging and precedence handling.
//!
//! Higher-precedence sources override lower ones field by field. Document
//! sources and command lists are replaced whole, never combined.

use crate::config::loader::ConfigSource;
use crate::config::schema::{Config, FileConfig};

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use graft::config::{Config, ConfigMerger};
/// use std::path::PathBuf;
///
/// let low = Config { declarations: Some(PathBuf::from("low.yaml")), ..Default::default() };
/// let high = Config { declarations: Some(PathBuf::from("high.yaml")), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.declarations, Some(PathBuf::from("high.yaml")));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge sources given from lowest to highest precedence.
    #[must_use]
    pub fn merge(sources: Vec<ConfigSource>) -> Config {
        let mut result = Config::default();
        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }
        result
    }

    /// Merge `source` into `target`, with `source` winning.
    ///
    /// # Merging Rules
    ///
    /// - Simple fields: source overwrites if Some
    /// - `state` and `schemas`: replaced whole, so a file never lingers
    ///   beside a command from another source
    /// - `files`: field-by-field merge
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.declarations.is_some() {
            target.declarations.clone_from(&source.declarations);
        }

        if source.state.is_some() {
            target.state.clone_from(&source.state);
        }

        if source.schemas.is_some() {
            target.schemas.clone_from(&source.schemas);
        }

        if source.import_command.is_some() {
            target.import_command.clone_from(&source.import_command);
        }

        if source.output_format.is_some() {
            target.output_format = source.output_format;
        }

        if source.auto_approve.is_some() {
            target.auto_approve = source.auto_approve;
        }

        if let Some(ref source_files) = source.files {
            target.files = Some(match &target.files {
                Some(target_files) => Self::merge_files(target_files, source_files),
                None => source_files.clone(),
            });
        }
    }

    fn merge_files(target: &FileConfig, source: &FileConfig) -> FileConfig {
        FileConfig {
            default_filename: source
                .default_filename
                .clone()
                .or_else(|| target.default_filename.clone()),
            source_suffix: source.source_suffix.clone().or_else(|| target.source_suffix.clone()),
            config_suffix: source.config_suffix.clone().or_else(|| target.config_suffix.clone()),
        }
    }
}
