use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PoolConfig {
    /// Reject zero-count `add`/`remove` calls
    #[serde(default = "default_strict_check")]
    pub strict_check: bool,

    /// Upper bound on unused values kept per reference type.
    /// Releases beyond it drop the value instead of retaining it.
    #[serde(default = "default_max_retained_per_type")]
    pub max_retained_per_type: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            strict_check: default_strict_check(),
            max_retained_per_type: default_max_retained_per_type(),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_retained_per_type == 0 {
            return Err(Error::Config(ConfigError::Message(
                "max_retained_per_type must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_strict_check() -> bool {
    false
}

fn default_max_retained_per_type() -> usize {
    1024
}
