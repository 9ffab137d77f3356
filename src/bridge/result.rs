use std::any::Any;
use std::fmt::Debug;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::pool::Pooled;
use crate::pool::Reference;

/// Correlation id handed out by a task manager when an operation starts
pub type SerialId = i32;

/// Opaque caller payload carried from `start_async` to the result
pub type UserData = Option<Arc<dyn Any + Send + Sync>>;

/// A delivered result. The pooled slot returns to its pool once the last
/// clone is dropped.
pub type SharedResult<R> = Arc<Pooled<R>>;

/// Pooled value a completion event is turned into.
///
/// A failure is data: `is_error` is set and the future still resolves.
pub trait CompletionResult: Reference + Sync {
    type Payload: Send + 'static;

    fn fill_success(
        &mut self,
        payload: Self::Payload,
        user_data: UserData,
    );

    fn fill_failure(
        &mut self,
        error_message: String,
        user_data: UserData,
    );

    fn is_error(&self) -> bool;

    fn error_message(&self) -> &str;

    fn user_data(&self) -> &UserData;

    /// Downcasts the user payload to a concrete type
    fn user_data_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.user_data().as_ref().and_then(|data| data.downcast_ref::<T>())
    }
}

/// Outcome of a web request
#[derive(Default)]
pub struct WebResult {
    bytes: Option<Vec<u8>>,
    is_error: bool,
    error_message: String,
    user_data: UserData,
}

impl WebResult {
    /// Response body, `None` for failures
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl Reference for WebResult {
    fn clear(&mut self) {
        self.bytes = None;
        self.is_error = false;
        self.error_message.clear();
        self.user_data = None;
    }
}

impl CompletionResult for WebResult {
    type Payload = Vec<u8>;

    fn fill_success(
        &mut self,
        payload: Vec<u8>,
        user_data: UserData,
    ) {
        self.bytes = Some(payload);
        self.is_error = false;
        self.error_message.clear();
        self.user_data = user_data;
    }

    fn fill_failure(
        &mut self,
        error_message: String,
        user_data: UserData,
    ) {
        self.bytes = None;
        self.is_error = true;
        self.error_message = error_message;
        self.user_data = user_data;
    }

    fn is_error(&self) -> bool {
        self.is_error
    }

    fn error_message(&self) -> &str {
        &self.error_message
    }

    fn user_data(&self) -> &UserData {
        &self.user_data
    }
}

impl Debug for WebResult {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("WebResult")
            .field("bytes", &self.bytes.as_ref().map(Vec::len))
            .field("is_error", &self.is_error)
            .field("error_message", &self.error_message)
            .finish()
    }
}

/// File written by a successful download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub length: u64,
}

/// Outcome of a download
#[derive(Default)]
pub struct DownloadResult {
    download_path: Option<PathBuf>,
    length: u64,
    is_error: bool,
    error_message: String,
    user_data: UserData,
}

impl DownloadResult {
    pub fn download_path(&self) -> Option<&Path> {
        self.download_path.as_deref()
    }

    pub fn length(&self) -> u64 {
        self.length
    }
}

impl Reference for DownloadResult {
    fn clear(&mut self) {
        self.download_path = None;
        self.length = 0;
        self.is_error = false;
        self.error_message.clear();
        self.user_data = None;
    }
}

impl CompletionResult for DownloadResult {
    type Payload = DownloadedFile;

    fn fill_success(
        &mut self,
        payload: DownloadedFile,
        user_data: UserData,
    ) {
        self.download_path = Some(payload.path);
        self.length = payload.length;
        self.is_error = false;
        self.error_message.clear();
        self.user_data = user_data;
    }

    fn fill_failure(
        &mut self,
        error_message: String,
        user_data: UserData,
    ) {
        self.download_path = None;
        self.length = 0;
        self.is_error = true;
        self.error_message = error_message;
        self.user_data = user_data;
    }

    fn is_error(&self) -> bool {
        self.is_error
    }

    fn error_message(&self) -> &str {
        &self.error_message
    }

    fn user_data(&self) -> &UserData {
        &self.user_data
    }
}

impl Debug for DownloadResult {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("DownloadResult")
            .field("download_path", &self.download_path)
            .field("length", &self.length)
            .field("is_error", &self.is_error)
            .field("error_message", &self.error_message)
            .finish()
    }
}

/// Pooled record of an operation that has started but not completed
pub(crate) struct PendingCompletion<R: CompletionResult> {
    user_data: UserData,
    sender: Option<oneshot::Sender<SharedResult<R>>>,
}

impl<R: CompletionResult> PendingCompletion<R> {
    pub(crate) fn fill(
        &mut self,
        user_data: UserData,
        sender: oneshot::Sender<SharedResult<R>>,
    ) {
        self.user_data = user_data;
        self.sender = Some(sender);
    }

    pub(crate) fn take_user_data(&mut self) -> UserData {
        self.user_data.take()
    }

    pub(crate) fn take_sender(&mut self) -> Option<oneshot::Sender<SharedResult<R>>> {
        self.sender.take()
    }
}

impl<R: CompletionResult> Default for PendingCompletion<R> {
    fn default() -> Self {
        Self {
            user_data: None,
            sender: None,
        }
    }
}

impl<R: CompletionResult> Reference for PendingCompletion<R> {
    fn clear(&mut self) {
        self.user_data = None;
        self.sender = None;
    }
}
