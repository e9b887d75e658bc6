//! Configuration system for graft.
//!
//! This module provides hierarchical configuration with support for:
//! - YAML configuration files (user config and project files)
//! - Environment variable overrides
//! - Programmatic configuration via builder pattern
//! - Validation of the merged result
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`GRAFT_*`)
//! 3. Private project config (`graft.local.yaml`)
//! 4. Project config (`graft.yaml`)
//! 5. User config (`~/.graft/config.yaml`)
//! 6. Built-in defaults
//!
//! # Examples
//!
//! Loading from a specific directory:
//!
//! ```no_run
//! use graft::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_working_dir("/path/to/project")
//!     .build()
//!     .unwrap();
//!
//! println!("Reading declarations from {}", config.declarations.display());
//! ```
//!
//! Programmatic configuration:
//!
//! ```
//! use graft::config::{Config, ConfigBuilder, SourceConfig};
//! use graft::external::DocumentOrigin;
//! use std::path::PathBuf;
//!
//! let custom = Config {
//!     state: Some(SourceConfig::file("/tmp/state.json")),
//!     ..Default::default()
//! };
//!
//! let config = ConfigBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .with_config(custom)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.state, DocumentOrigin::File(PathBuf::from("/tmp/state.json")));
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use builder::{ConfigBuilder, ResolvedConfig, DEFAULT_DECLARATIONS};
pub use environment::EnvironmentConfig;
pub use loader::{default_config_dir, ConfigLoader, ConfigSource};
pub use merger::ConfigMerger;
pub use schema::{Config, FileConfig, OutputFormat, SourceConfig};
pub use validator::ConfigValidator;
