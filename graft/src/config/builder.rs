//! Builder that assembles the effective configuration.

use std::env;
use std::path::PathBuf;

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::merger::ConfigMerger;
use crate::config::schema::{Config, OutputFormat};
use crate::config::validator::ConfigValidator;
use crate::error::Result;
use crate::external::DocumentOrigin;
use crate::operations::FilenamePolicy;

/// Declarations file used when none is configured.
pub const DEFAULT_DECLARATIONS: &str = "graft.imports.yaml";

fn argv(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

/// Loads, merges, overrides and validates configuration.
///
/// # Examples
///
/// ```
/// use graft::config::{Config, ConfigBuilder};
/// use std::path::PathBuf;
///
/// let resolved = ConfigBuilder::new()
///     .with_working_dir("/work")
///     .skip_files()
///     .skip_env()
///     .with_config(Config { auto_approve: Some(true), ..Default::default() })
///     .build()
///     .unwrap();
///
/// assert!(resolved.auto_approve);
/// assert_eq!(resolved.declarations, PathBuf::from("/work/graft.imports.yaml"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    working_dir: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    skip_files: bool,
    skip_env: bool,
    overrides: Option<Config>,
}

impl ConfigBuilder {
    /// Creates a builder that reads files and environment from the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovers project files from `dir` and resolves relative paths against it.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Reads the user configuration from `dir` instead of `~/.graft`.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Ignores configuration files.
    #[must_use]
    pub const fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Ignores `GRAFT_*` environment variables.
    #[must_use]
    pub const fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Applies `config` over every other source.
    ///
    /// Repeated calls merge, later calls winning.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        match self.overrides {
            Some(ref mut existing) => ConfigMerger::merge_into(existing, &config),
            None => self.overrides = Some(config),
        }
        self
    }

    /// The merged configuration before defaults are filled in.
    ///
    /// # Errors
    ///
    /// Returns an error if a file or variable cannot be parsed or the result
    /// fails validation.
    pub fn merged(&self) -> Result<Config> {
        let working_dir = self.working_dir()?;
        let mut config = if self.skip_files {
            Config::default()
        } else {
            ConfigMerger::merge(ConfigLoader::load_all(&working_dir, self.config_dir.as_deref())?)
        };

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }

        if let Some(ref overrides) = self.overrides {
            ConfigMerger::merge_into(&mut config, overrides);
        }

        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Builds the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a file or variable cannot be parsed or the result
    /// fails validation.
    pub fn build(self) -> Result<ResolvedConfig> {
        let config = self.merged()?;
        let working_dir = self.working_dir()?;
        Ok(ResolvedConfig::from_config(config, working_dir))
    }

    fn working_dir(&self) -> Result<PathBuf> {
        match self.working_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(env::current_dir()?),
        }
    }
}

/// Effective configuration with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Directory relative paths were resolved against.
    pub working_dir: PathBuf,
    /// Declarations document.
    pub declarations: PathBuf,
    /// Where state is read from.
    pub state: DocumentOrigin,
    /// Where provider schemas are read from.
    pub schemas: DocumentOrigin,
    /// Command prefix that binds one instance.
    pub import_command: Vec<String>,
    /// How destination files are named.
    pub filename_policy: FilenamePolicy,
    /// Format for plan listings.
    pub output_format: OutputFormat,
    /// Whether to apply without confirmation.
    pub auto_approve: bool,
}

impl ResolvedConfig {
    /// Fills defaults into `config`, resolving relative paths against `working_dir`.
    #[must_use]
    pub fn from_config(config: Config, working_dir: PathBuf) -> Self {
        let resolve = |path: PathBuf| -> PathBuf {
            if path.is_relative() {
                working_dir.join(path)
            } else {
                path
            }
        };
        let origin = |source: Option<DocumentOrigin>, default: &[&str]| match source {
            Some(DocumentOrigin::File(path)) => DocumentOrigin::File(resolve(path)),
            Some(command) => command,
            None => DocumentOrigin::Command(argv(default)),
        };

        let defaults = FilenamePolicy::default();
        let files = config.files.unwrap_or_default();
        let filename_policy = FilenamePolicy {
            default_filename: files.default_filename.unwrap_or(defaults.default_filename),
            source_suffix: files.source_suffix.unwrap_or(defaults.source_suffix),
            config_suffix: files.config_suffix.unwrap_or(defaults.config_suffix),
        };

        Self {
            declarations: resolve(
                config
                    .declarations
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DECLARATIONS)),
            ),
            state: origin(
                config.state.as_ref().and_then(|s| s.origin()),
                &["terraform", "show", "-json"],
            ),
            schemas: origin(
                config.schemas.as_ref().and_then(|s| s.origin()),
                &["terraform", "providers", "schema", "-json"],
            ),
            import_command: config
                .import_command
                .unwrap_or_else(|| argv(&["terraform", "import", "-allow-missing-config"])),
            filename_policy,
            output_format: config.output_format.unwrap_or_default(),
            auto_approve: config.auto_approve.unwrap_or(false),
            working_dir,
        }
    }
}
