use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::warn;

use super::CompletionBridge;
use super::CompletionFuture;
use super::DownloadResult;
use super::DownloadedFile;
use super::SerialId;
use super::UserData;
use crate::constants::DEFAULT_PRIORITY;
use crate::pool::ReferencePool;
use crate::CompletionConfig;
use crate::Result;

/// External download manager writing remote files to local paths.
#[cfg_attr(test, automock)]
pub trait DownloadManager: Send + Sync + 'static {
    fn add_download(
        &self,
        download_path: &Path,
        download_uri: &str,
        tag: Option<String>,
        priority: i32,
    ) -> SerialId;

    fn remove_download(
        &self,
        serial_id: SerialId,
    ) -> bool;

    fn remove_all_downloads(&self) -> usize;

    fn paused(&self) -> bool;

    fn set_paused(
        &self,
        paused: bool,
    );

    fn timeout(&self) -> Duration;

    fn set_timeout(
        &self,
        timeout: Duration,
    );
}

#[derive(Debug, Clone)]
pub struct DownloadSuccessEvent {
    pub serial_id: SerialId,
    pub download_path: PathBuf,
    pub download_uri: String,
    pub current_length: u64,
}

#[derive(Debug, Clone)]
pub struct DownloadFailureEvent {
    pub serial_id: SerialId,
    pub download_path: PathBuf,
    pub download_uri: String,
    pub error_message: String,
}

/// Awaitable front of a [`DownloadManager`]
pub struct DownloadBridge<M: DownloadManager> {
    manager: Arc<M>,
    completion: CompletionBridge<DownloadResult>,
}

impl<M: DownloadManager> DownloadBridge<M> {
    pub fn new(
        manager: Arc<M>,
        pool: Arc<ReferencePool>,
        config: &CompletionConfig,
    ) -> Self {
        Self {
            manager,
            completion: CompletionBridge::new(pool, config),
        }
    }

    /// Adds a download and returns the future of its [`DownloadResult`].
    pub fn add_download_async(
        &self,
        download_path: impl AsRef<Path>,
        download_uri: &str,
        user_data: UserData,
    ) -> Result<CompletionFuture<DownloadResult>> {
        let download_path = download_path.as_ref();
        self.completion.start_async(user_data, || {
            self.manager.add_download(download_path, download_uri, None, DEFAULT_PRIORITY)
        })
    }

    pub fn handle_success(
        &self,
        event: DownloadSuccessEvent,
    ) -> bool {
        let file = DownloadedFile {
            path: event.download_path,
            length: event.current_length,
        };
        self.completion.on_success(event.serial_id, file)
    }

    pub fn handle_failure(
        &self,
        event: DownloadFailureEvent,
    ) -> bool {
        warn!(
            "Download failure, download serial id '{}', download path '{}', download uri '{}', error message '{}'.",
            event.serial_id,
            event.download_path.display(),
            event.download_uri,
            event.error_message
        );
        self.completion.on_failure(event.serial_id, event.error_message)
    }

    /// Removes a download from the manager and abandons its future.
    pub fn remove_download(
        &self,
        serial_id: SerialId,
    ) -> bool {
        let removed = self.manager.remove_download(serial_id);
        if removed {
            self.completion.abandon(serial_id);
        }
        removed
    }

    pub fn remove_all_downloads(&self) -> usize {
        let removed = self.manager.remove_all_downloads();
        self.completion.abandon_all();
        removed
    }

    pub fn paused(&self) -> bool {
        self.manager.paused()
    }

    pub fn set_paused(
        &self,
        paused: bool,
    ) {
        self.manager.set_paused(paused)
    }

    pub fn timeout(&self) -> Duration {
        self.manager.timeout()
    }

    pub fn set_timeout(
        &self,
        timeout: Duration,
    ) {
        self.manager.set_timeout(timeout)
    }

    pub fn completion(&self) -> &CompletionBridge<DownloadResult> {
        &self.completion
    }

    pub fn shutdown(&self) {
        self.completion.shutdown()
    }
}
