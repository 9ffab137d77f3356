use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// When the bridge lets go of its reference to a delivered result
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleasePolicy {
    /// The bridge keeps every delivered result until no operation is
    /// outstanding, then drops the whole batch at once.
    #[default]
    Batched,
    /// The bridge keeps nothing; the caller's handle is the only owner.
    Immediate,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CompletionConfig {
    #[serde(default)]
    pub release_policy: ReleasePolicy,
}

impl CompletionConfig {
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}
