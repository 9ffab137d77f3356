//! Error hierarchy for the completion bridge and the background log writer.
//!
//! Operation outcomes reported by the task managers are never errors here:
//! they travel as data inside the completion results. The types below cover
//! configuration, pool bookkeeping, writer start-up and abandoned operations.

use std::path::PathBuf;

use config::ConfigError;

use crate::SerialId;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (filesystem, pool bookkeeping)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Settings loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Completion bridge failures
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Background log writer start-up failures
    #[error(transparent)]
    LogWriter(#[from] LogWriterError),

    /// Unrecoverable failures
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Reference pool error: {0}")]
    Pool(#[from] PoolError),
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// `add`/`remove` called with a zero count while strict checking is on
    #[error("Invalid count {count} for reference type {type_name}")]
    InvalidCount { type_name: &'static str, count: usize },

    /// More values requested for removal than the free list holds
    #[error("Not enough unused references of type {type_name} to remove {requested} (unused: {unused})")]
    NotEnoughUnused {
        type_name: &'static str,
        requested: usize,
        unused: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The operation can no longer complete: removed, displaced or shut down
    #[error("Operation {serial_id} abandoned before completion")]
    Abandoned { serial_id: SerialId },

    /// `start_async` called after `shutdown`
    #[error("Completion bridge is shut down")]
    ShutDown,
}

#[derive(Debug, thiserror::Error)]
pub enum LogWriterError {
    #[error("Failed to create log directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn log writer thread: {0}")]
    Spawn(#[source] std::io::Error),
}

// ============== Conversion Implementations ============== //
impl From<PoolError> for Error {
    fn from(e: PoolError) -> Self {
        Error::System(SystemError::Pool(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::System(SystemError::Io(e))
    }
}
