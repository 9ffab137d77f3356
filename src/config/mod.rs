//! Settings for the completion bridge, the reference pool and the file log writer.
//!
//! Hierarchical loading with:
//! - Default values as code base
//! - Configuration file named by `CONFIG_PATH`
//! - Environment variable overrides (`UGF__` prefix)
//! - Section-wise validation
mod completion;
mod log_output;
mod pool;
pub use completion::*;
pub use log_output::*;
pub use pool::*;


use std::env;
use std::fmt::Debug;
use std::path::Path;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Main settings container
///
/// Combines all section configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct BridgeSettings {
    /// File log output
    #[serde(default)]
    pub log: LogOutputConfig,
    /// Reference pool sizing and checks
    #[serde(default)]
    pub pool: PoolConfig,
    /// Completion bridge behaviour
    #[serde(default)]
    pub completion: CompletionConfig,
}

impl Debug for BridgeSettings {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("BridgeSettings")
            .field("log", &self.log)
            .field("pool", &self.pool)
            .field("completion", &self.completion)
            .finish()
    }
}

impl BridgeSettings {
    /// Loads settings from hierarchical sources without validation.
    ///
    /// Sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `UGF__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred so callers can stack `with_override_config()`.
    /// Call `validate()` before handing the settings to any component.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("UGF__LOG__MIN_LEVEL", "Warning");
    /// let settings = BridgeSettings::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let settings: Self = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Applies additional overrides from a file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let settings: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.log.validate()?;
        self.pool.validate()?;
        self.completion.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("UGF")
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}

/// Ensures a directory path is usable as an output root
pub(super) fn validate_directory(
    path: &Path,
    name: &str,
) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::Config(ConfigError::Message(format!(
            "{name} path cannot be empty"
        ))));
    }

    if path.exists() && !path.is_dir() {
        return Err(Error::Config(ConfigError::Message(format!(
            "{} path {} exists and is not a directory",
            name,
            path.display()
        ))));
    }

    Ok(())
}
