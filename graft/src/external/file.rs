//! Appending generated blocks to configuration files.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::ConfigSink;
use crate::error::CollaboratorError;
use crate::output::render_block;
use crate::synthesis::Block;

/// Renders blocks and appends them to files on disk.
///
/// Relative filenames resolve against the base directory when one is set.
/// A block appended to a file that already has content is separated from it
/// by a blank line.
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    base_dir: Option<PathBuf>,
}

impl FileSink {
    /// Creates a sink that resolves relative filenames against the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative filenames against `dir`.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Where `filename` is written.
    #[must_use]
    pub fn resolve(&self, filename: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if filename.is_relative() => base.join(filename),
            _ => filename.to_path_buf(),
        }
    }
}

impl ConfigSink for FileSink {
    fn append(&mut self, filename: &Path, block: &Block) -> Result<(), CollaboratorError> {
        let path = self.resolve(filename);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let existing = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };

        let mut text = String::new();
        if !existing.is_empty() {
            if !existing.ends_with('\n') {
                text.push('\n');
            }
            text.push('\n');
        }
        text.push_str(&render_block(block));

        log::debug!("Appending {} {:?} to {}", block.block_type, block.labels, path.display());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }
}
