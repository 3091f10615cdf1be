//! Load Configuration Use Case
//!
//! Reads the `KEY=VALUE` configuration file. When it is missing, the
//! template next to it is copied into place first. Values that cannot be
//! used fall back to defaults with a warning; only a missing file with no
//! template is fatal.

use std::path::PathBuf;
use std::sync::Arc;

use authprobe_domain::EnvFile;
use authprobe_domain::ProbeConfig;
use authprobe_domain::config::ConfigWarning;
use thiserror::Error;
use tracing::{info, warn};

use crate::ports::{FileSystem, FileSystemError};

/// Errors that stop configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither the file nor its template exists.
    #[error("configuration file {primary} not found and no template at {template}")]
    Missing {
        /// Expected configuration file
        primary: PathBuf,
        /// Template that would have been copied
        template: PathBuf,
    },

    /// The template exists but could not be copied.
    #[error("failed to create {path} from template: {source}")]
    TemplateCopy {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: FileSystemError,
    },

    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: FileSystemError,
    },
}

/// Where configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// Configuration file, conventionally `.env`
    pub primary: PathBuf,
    /// Template copied into place when the file is missing
    pub template: PathBuf,
    /// Values that take precedence over the file, such as CLI flags
    pub overrides: EnvFile,
}

impl ConfigSource {
    /// Creates a source from the two paths.
    #[must_use]
    pub fn new(primary: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            template: template.into(),
            overrides: EnvFile::new(),
        }
    }

    /// Sets values that override the file.
    #[must_use]
    pub fn with_overrides(mut self, overrides: EnvFile) -> Self {
        self.overrides = overrides;
        self
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::new(".env", ".env.example")
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedConfiguration {
    /// Raw key/value pairs, for CLI overrides
    pub env: EnvFile,
    /// Resolved configuration
    pub config: ProbeConfig,
    /// Values replaced by defaults
    pub warnings: Vec<ConfigWarning>,
    /// True if the file was created from the template
    pub created_from_template: bool,
}

/// Use case for loading the probe configuration.
pub struct LoadConfiguration<F: FileSystem> {
    fs: Arc<F>,
}

impl<F: FileSystem> LoadConfiguration<F> {
    /// Creates the use case over a file system.
    pub const fn new(fs: Arc<F>) -> Self {
        Self { fs }
    }

    /// Loads and resolves the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if neither file exists, or an I/O
    /// variant if a file exists but cannot be read or copied.
    pub async fn execute(&self, source: &ConfigSource) -> Result<LoadedConfiguration, ConfigError> {
        let created_from_template = self.ensure_primary(source).await?;

        let contents = self
            .fs
            .read_file_string(&source.primary)
            .await
            .map_err(|source_err| ConfigError::Read {
                path: source.primary.clone(),
                source: source_err,
            })?;

        let mut env = EnvFile::parse(&contents);
        env.merge(&source.overrides);
        let (config, warnings) = ProbeConfig::from_env(&env);

        for warning in &warnings {
            warn!(
                key = %warning.key,
                value = %warning.value,
                reason = %warning.reason,
                "ignoring configuration value, using default"
            );
        }
        info!(
            path = %source.primary.display(),
            keys = env.len(),
            "configuration loaded"
        );

        Ok(LoadedConfiguration {
            env,
            config,
            warnings,
            created_from_template,
        })
    }

    async fn ensure_primary(&self, source: &ConfigSource) -> Result<bool, ConfigError> {
        if self.fs.exists(&source.primary).await {
            return Ok(false);
        }
        if !self.fs.exists(&source.template).await {
            return Err(ConfigError::Missing {
                primary: source.primary.clone(),
                template: source.template.clone(),
            });
        }

        info!(
            from = %source.template.display(),
            to = %source.primary.display(),
            "configuration file missing, copying template"
        );
        self.fs
            .copy_file(&source.template, &source.primary)
            .await
            .map_err(|e| ConfigError::TemplateCopy {
                path: source.primary.clone(),
                source: e,
            })?;
        Ok(true)
    }
}
