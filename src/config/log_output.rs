use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use super::validate_directory;
use crate::constants::DEFAULT_LOG_DIR_NAME;
use crate::Error;
use crate::LogOutputLevel;
use crate::Result;

/// File log output settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogOutputConfig {
    /// Whether records are persisted to a file at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Records below this level never reach the file.
    /// `Max` turns file output off while keeping the writer constructible.
    #[serde(default = "default_min_level")]
    pub min_level: LogOutputLevel,

    /// Platform-provided persistent-data root
    #[serde(default = "default_persistent_data_root")]
    pub persistent_data_root: PathBuf,

    /// Fixed subdirectory of the root that holds the log files
    #[serde(default = "default_log_dir_name")]
    pub log_dir_name: String,
}

impl Default for LogOutputConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            min_level: default_min_level(),
            persistent_data_root: default_persistent_data_root(),
            log_dir_name: default_log_dir_name(),
        }
    }
}

impl LogOutputConfig {
    /// Directory the writer creates its file in
    pub fn log_dir(&self) -> PathBuf {
        self.persistent_data_root.join(&self.log_dir_name)
    }

    /// Validates log output settings
    /// # Errors
    /// Returns `Error::Config` when:
    /// - the persistent-data root is empty or names a regular file
    /// - the log directory name is empty or is not a single path component
    pub fn validate(&self) -> Result<()> {
        validate_directory(&self.persistent_data_root, "persistent_data_root")?;

        if self.log_dir_name.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "log_dir_name cannot be empty".into(),
            )));
        }

        if self.log_dir_name.contains(['/', '\\']) {
            return Err(Error::Config(ConfigError::Message(format!(
                "log_dir_name {} must be a single directory name",
                self.log_dir_name
            ))));
        }

        if !self.enabled && self.min_level != default_min_level() {
            tracing::warn!(
                "log min_level configured to {:?} but file output is disabled",
                self.min_level
            );
        }

        Ok(())
    }
}

fn default_enabled() -> bool {
    false
}

fn default_min_level() -> LogOutputLevel {
    LogOutputLevel::Max
}

fn default_persistent_data_root() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_dir_name() -> String {
    DEFAULT_LOG_DIR_NAME.to_string()
}
