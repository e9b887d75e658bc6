//! Error types for the graft library.
//!
//! This module provides the error hierarchy for planning imports, reading
//! state and schema documents, and synthesizing configuration, using
//! `thiserror` for ergonomic error handling.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a graft error.
///
/// # Examples
///
/// ```
/// use graft::{Error, Result};
///
/// fn example_operation() -> Result<String> {
///     Ok("aws_instance.web".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error reported by an external collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for the graft library.
#[derive(Debug, Error)]
pub enum Error {
    /// A resource address could not be parsed.
    #[error("invalid resource address {input:?}: {reason}")]
    InvalidAddress {
        /// The text that failed to parse.
        input: String,
        /// Why the address is invalid.
        reason: String,
    },

    /// An import target's desired ids have an unsupported shape.
    #[error("invalid import id for {address}: {reason}")]
    InvalidId {
        /// The resource address the id belongs to.
        address: String,
        /// Why the id is invalid.
        reason: String,
    },

    /// Instances of one resource use more than one kind of instance key.
    #[error("instances of {resource} mix different kinds of instance key")]
    MixedInstanceKeys {
        /// The offending resource.
        resource: String,
    },

    /// An instance key does not match the resource's repetition mode.
    #[error("instance keys of {resource} do not match its repetition: expected {expected}, found {found}")]
    InstanceKeyMismatch {
        /// The offending resource.
        resource: String,
        /// The key kind implied by the repetition mode.
        expected: String,
        /// The key kind actually observed.
        found: String,
    },

    /// No schema is available for a provider and resource type.
    #[error("provider {provider:?} has no schema for resource type {resource_type:?}")]
    SchemaNotFound {
        /// The provider that was searched.
        provider: String,
        /// The resource type that was requested.
        resource_type: String,
    },

    /// Recorded instance data was written under a different schema version.
    #[error(
        "{instance} was recorded with schema version {recorded}, but the provider now uses \
         version {current}; run a refresh to upgrade the recorded state and try again"
    )]
    SchemaVersionMismatch {
        /// The instance whose data is stale.
        instance: String,
        /// Schema version stored alongside the instance data.
        recorded: u64,
        /// Schema version the provider currently reports.
        current: u64,
    },

    /// Recorded instance data does not conform to the resource's schema.
    #[error("{instance} has invalid state data: {reason}")]
    StateDecode {
        /// The instance whose data failed to decode.
        instance: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A state document could not be interpreted.
    #[error("invalid state document: {reason}")]
    InvalidState {
        /// Why the document is invalid.
        reason: String,
    },

    /// A provider schema document could not be interpreted.
    #[error("invalid provider schema: {reason}")]
    InvalidSchema {
        /// Why the schema is invalid.
        reason: String,
    },

    /// Binding an instance to a remote object failed.
    #[error("could not import {address} with id {id:?}: {source}")]
    BindFailed {
        /// The instance being bound.
        address: String,
        /// The remote object id.
        id: String,
        /// The underlying error.
        #[source]
        source: CollaboratorError,
    },

    /// Appending a generated block to a file failed.
    #[error("could not update {} with new configuration: {source}", filename.display())]
    AppendFailed {
        /// The destination file.
        filename: PathBuf,
        /// The underlying error.
        #[source]
        source: CollaboratorError,
    },

    /// An external command exited unsuccessfully.
    #[error("command `{command}` failed ({status}): {stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A JSON document could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// The requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },
}

impl Error {
    /// Check if error is scoped to a single import target.
    ///
    /// Input errors are collected per target while planning continues.
    ///
    /// # Examples
    ///
    /// ```
    /// use graft::Error;
    ///
    /// let err = Error::InvalidId {
    ///     address: "aws_instance.web".to_string(),
    ///     reason: "must be a string".to_string(),
    /// };
    /// assert!(err.is_input_error());
    /// ```
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidId { .. } | Self::InvalidAddress { .. })
    }

    /// Check if error means recorded state cannot be interpreted safely.
    ///
    /// # Examples
    ///
    /// ```
    /// use graft::Error;
    ///
    /// let err = Error::SchemaNotFound {
    ///     provider: "aws".to_string(),
    ///     resource_type: "aws_instance".to_string(),
    /// };
    /// assert!(err.is_schema_error());
    /// ```
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound { .. }
                | Self::SchemaVersionMismatch { .. }
                | Self::InvalidSchema { .. }
                | Self::StateDecode { .. }
        )
    }

    /// Check if error came from a failed bind operation.
    #[must_use]
    pub fn is_bind_error(&self) -> bool {
        matches!(self, Self::BindFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_error() {
        let err = Error::InvalidId {
            address: "aws_instance.web".to_string(),
            reason: "must be a string, a list of strings, or a map of strings".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("aws_instance.web"));
        assert!(display.contains("map of strings"));
        assert!(err.is_input_error());
        assert!(!err.is_schema_error());
    }

    #[test]
    fn test_schema_version_mismatch_names_everything() {
        let err = Error::SchemaVersionMismatch {
            instance: "aws_instance.web[0]".to_string(),
            recorded: 1,
            current: 2,
        };
        let display = format!("{err}");
        assert!(display.contains("aws_instance.web[0]"));
        assert!(display.contains("version 1"));
        assert!(display.contains("version 2"));
        assert!(display.contains("refresh"));
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_schema_not_found_error() {
        let err = Error::SchemaNotFound {
            provider: "aws".to_string(),
            resource_type: "aws_instance".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("\"aws\""));
        assert!(display.contains("\"aws_instance\""));
    }

    #[test]
    fn test_bind_failed_keeps_source() {
        let source: CollaboratorError = "backend unreachable".into();
        let err = Error::BindFailed {
            address: "aws_instance.web".to_string(),
            id: "i-123".to_string(),
            source,
        };
        assert!(err.is_bind_error());
        assert!(format!("{err}").contains("backend unreachable"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_append_failed_error() {
        let source: CollaboratorError = "read-only filesystem".into();
        let err = Error::AppendFailed {
            filename: PathBuf::from("imported.tf"),
            source,
        };
        let display = format!("{err}");
        assert!(display.contains("imported.tf"));
        assert!(display.contains("read-only filesystem"));
    }

    #[test]
    fn test_validation_error() {
        let err = Error::Validation {
            field: "state".to_string(),
            message: "file and command are mutually exclusive".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("validation error"));
        assert!(display.contains("state"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
