use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use tokio::sync::oneshot;

use super::CompletionResult;
use super::SerialId;
use super::SharedResult;
use crate::BridgeError;
use crate::Result;

/// Single-resolution handle to the outcome of one started operation.
///
/// Resolves with the result on either completion event. The only error is
/// [`BridgeError::Abandoned`], when the operation can no longer complete.
#[must_use = "the operation outcome is only observable by awaiting the future"]
pub struct CompletionFuture<R: CompletionResult> {
    serial_id: SerialId,
    receiver: oneshot::Receiver<SharedResult<R>>,
}

impl<R: CompletionResult> CompletionFuture<R> {
    pub(crate) fn new(
        serial_id: SerialId,
        receiver: oneshot::Receiver<SharedResult<R>>,
    ) -> Self {
        Self { serial_id, receiver }
    }

    /// Correlation id the manager assigned to the operation
    pub fn serial_id(&self) -> SerialId {
        self.serial_id
    }
}

impl<R: CompletionResult> Future for CompletionFuture<R> {
    type Output = Result<SharedResult<R>>;

    fn poll(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Self::Output> {
        let this = self.get_mut();
        let serial_id = this.serial_id;
        Pin::new(&mut this.receiver)
            .poll(cx)
            .map(|received| received.map_err(|_| BridgeError::Abandoned { serial_id }.into()))
    }
}

impl<R: CompletionResult> std::fmt::Debug for CompletionFuture<R> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("CompletionFuture").field("serial_id", &self.serial_id).finish()
    }
}
