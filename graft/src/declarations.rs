//! Import declarations.
//!
//! A declarations document names the remote objects to import and the
//! resources already present in configuration:
//!
//! ```yaml
//! imports:
//!   - resource: aws_instance.web
//!     id: ["i-0a1", "i-0b2"]
//!     source: web.tfy
//!     provider: aws
//! declared:
//!   - aws_vpc.main
//! ```
//!
//! `id` may be a string or number (one instance), a list (`count`) or a map
//! (`for_each`). Documents with a `.json` extension are read as JSON,
//! anything else as YAML.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::address::{ResourceAddress, ResourceMode};
use crate::error::{Error, Result};
use crate::operations::{DesiredIds, ImportTarget};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationsDocument {
    #[serde(default)]
    imports: Vec<ImportEntry>,
    #[serde(default)]
    declared: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImportEntry {
    resource: String,
    id: serde_json::Value,
    #[serde(default)]
    source: Option<PathBuf>,
    #[serde(default)]
    provider: Option<String>,
}

/// Import targets and declared resources loaded from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declarations {
    /// Resources to import, in document order.
    pub targets: Vec<ImportTarget>,
    /// Resources that already have configuration.
    pub declared: BTreeSet<ResourceAddress>,
}

impl Declarations {
    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or declares an invalid,
    /// duplicate or data-mode import target.
    ///
    /// # Examples
    ///
    /// ```
    /// use graft::declarations::Declarations;
    /// use graft::RepeatMode;
    ///
    /// let decls = Declarations::from_yaml(
    ///     "imports:\n  - resource: aws_instance.web\n    id: {blue: i-1, green: i-2}\ndeclared: [aws_vpc.main]\n",
    /// )
    /// .unwrap();
    /// assert_eq!(decls.targets.len(), 1);
    /// assert_eq!(decls.targets[0].desired_ids.repeat_mode(), RepeatMode::ForEach);
    /// assert_eq!(decls.declared.len(), 1);
    /// ```
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: DeclarationsDocument = serde_yaml::from_str(text)?;
        Self::from_document(document, None)
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or declares an invalid,
    /// duplicate or data-mode import target.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: DeclarationsDocument = serde_json::from_str(text)?;
        Self::from_document(document, None)
    }

    /// Loads a declarations file.
    ///
    /// Targets without an explicit `source` are attributed to the file
    /// itself, and relative `source` paths resolve against its directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file does not exist, and a parse or
    /// validation error otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound {
                resource: format!("declarations file {}", path.display()),
            });
        }
        log::debug!("Loading declarations from {}", path.display());
        let text = fs::read_to_string(path)?;
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let document: DeclarationsDocument = if is_json {
            serde_json::from_str(&text)?
        } else if text.trim().is_empty() {
            DeclarationsDocument::default()
        } else {
            serde_yaml::from_str(&text)?
        };
        Self::from_document(document, Some(path))
    }

    fn from_document(document: DeclarationsDocument, origin: Option<&Path>) -> Result<Self> {
        let base_dir = origin.and_then(Path::parent);
        let mut targets = Vec::with_capacity(document.imports.len());
        let mut seen = BTreeSet::new();

        for (i, entry) in document.imports.into_iter().enumerate() {
            let field = format!("imports[{i}].resource");
            let address: ResourceAddress = entry.resource.parse()?;
            if address.mode == ResourceMode::Data {
                return Err(Error::Validation {
                    field,
                    message: format!("{address} is a data resource; only managed resources can be imported"),
                });
            }
            if !seen.insert(address.clone()) {
                return Err(Error::Validation {
                    field,
                    message: format!("{address} is declared more than once"),
                });
            }
            if entry.provider.as_deref().is_some_and(str::is_empty) {
                return Err(Error::Validation {
                    field: format!("imports[{i}].provider"),
                    message: "provider name cannot be empty".to_string(),
                });
            }

            let source = match (entry.source, base_dir) {
                (Some(source), Some(dir)) if source.is_relative() => Some(dir.join(source)),
                (Some(source), _) => Some(source),
                (None, _) => origin.map(Path::to_path_buf),
            };

            targets.push(ImportTarget {
                address,
                desired_ids: DesiredIds::from_raw(entry.id),
                source,
                provider: entry.provider,
            });
        }

        let declared = document
            .declared
            .iter()
            .map(|s| s.parse())
            .collect::<Result<BTreeSet<ResourceAddress>>>()?;

        Ok(Self { targets, declared })
    }

    /// Whether nothing is declared at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.declared.is_empty()
    }
}
