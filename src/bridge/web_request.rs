use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::warn;

use super::CompletionBridge;
use super::CompletionFuture;
use super::SerialId;
use super::UserData;
use super::WebResult;
use crate::constants::DEFAULT_PRIORITY;
use crate::pool::ReferencePool;
use crate::CompletionConfig;
use crate::Result;

/// External web request manager performing the actual transfers.
///
/// Completion is reported later through [`WebRequestSuccessEvent`] and
/// [`WebRequestFailureEvent`], tagged with the returned serial id.
#[cfg_attr(test, automock)]
pub trait WebRequestManager: Send + Sync + 'static {
    fn add_web_request(
        &self,
        web_request_uri: &str,
        post_data: Option<Vec<u8>>,
        tag: Option<String>,
        priority: i32,
    ) -> SerialId;

    fn remove_web_request(
        &self,
        serial_id: SerialId,
    ) -> bool;

    fn remove_all_web_requests(&self) -> usize;

    fn waiting_task_count(&self) -> usize;

    fn timeout(&self) -> Duration;

    fn set_timeout(
        &self,
        timeout: Duration,
    );
}

#[derive(Debug, Clone)]
pub struct WebRequestSuccessEvent {
    pub serial_id: SerialId,
    pub web_request_uri: String,
    pub response_bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct WebRequestFailureEvent {
    pub serial_id: SerialId,
    pub web_request_uri: String,
    pub error_message: String,
}

/// Awaitable front of a [`WebRequestManager`]
pub struct WebRequestBridge<M: WebRequestManager> {
    manager: Arc<M>,
    completion: CompletionBridge<WebResult>,
}

impl<M: WebRequestManager> WebRequestBridge<M> {
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

    /// Adds a web request and returns the future of its [`WebResult`].
    ///
    /// ```ignore
    /// let result = bridge.add_web_request_async("https://example.com", None, None)?.await?;
    /// if !result.is_error() {
    ///     consume(result.bytes());
    /// }
    /// ```
    pub fn add_web_request_async(
        &self,
        web_request_uri: &str,
        post_data: Option<Vec<u8>>,
        user_data: UserData,
    ) -> Result<CompletionFuture<WebResult>> {
        self.completion.start_async(user_data, || {
            self.manager.add_web_request(web_request_uri, post_data, None, DEFAULT_PRIORITY)
        })
    }

    /// Routes a success event; `false` when the id is not awaited here.
    pub fn handle_success(
        &self,
        event: WebRequestSuccessEvent,
    ) -> bool {
        self.completion.on_success(event.serial_id, event.response_bytes)
    }

    /// Routes a failure event; `false` when the id is not awaited here.
    pub fn handle_failure(
        &self,
        event: WebRequestFailureEvent,
    ) -> bool {
        warn!(
            "Web request failure, web request serial id '{}', web request uri '{}', error message '{}'.",
            event.serial_id, event.web_request_uri, event.error_message
        );
        self.completion.on_failure(event.serial_id, event.error_message)
    }

    /// Removes a request from the manager and abandons its future.
    pub fn remove_web_request(
        &self,
        serial_id: SerialId,
    ) -> bool {
        let removed = self.manager.remove_web_request(serial_id);
        if removed {
            self.completion.abandon(serial_id);
        }
        removed
    }

    pub fn remove_all_web_requests(&self) -> usize {
        let removed = self.manager.remove_all_web_requests();
        self.completion.abandon_all();
        removed
    }

    pub fn waiting_task_count(&self) -> usize {
        self.manager.waiting_task_count()
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

    pub fn completion(&self) -> &CompletionBridge<WebResult> {
        &self.completion
    }

    pub fn shutdown(&self) {
        self.completion.shutdown()
    }
}
