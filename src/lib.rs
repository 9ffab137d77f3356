//! # ugf-bridge
//!
//! Async completion bridge and background file log output for a game
//! framework host.
//!
//! ## What this crate provides
//!
//! - **Completion bridge** - turns `(serial id, success | failure)` events
//!   raised by web request and download managers into awaitable futures
//!   resolving with pooled results
//! - **Reference pool** - typed free lists the results are recycled through
//! - **Background log writer** - persists host log records to a file from a
//!   dedicated thread, with level and thread-affinity filtering
//!
//! The task managers themselves, and the host's log hooks, are **your
//! responsibility**: implement [`WebRequestManager`] / [`DownloadManager`]
//! and feed their events to the bridges, and forward log records to a
//! [`BackgroundLogWriter`] (or install a [`FileLogLayer`]).
//!
//! ## Configuration
//!
//! [`BridgeSettings::new`] merges code defaults, the file named by
//! `CONFIG_PATH` and `UGF__`-prefixed environment variables.

mod bridge;
mod config;
mod constants;
mod errors;
mod logging;
pub mod pool;
pub mod utils;

pub use bridge::*;
pub use config::*;
pub use errors::*;
pub use logging::*;
pub use pool::Pooled;
pub use pool::Reference;
pub use pool::ReferencePool;
pub use pool::ReferencePoolInfo;
pub use utils::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
