//! Event-to-future completion bridge.
//!
//! A task manager starts an operation and later raises a success or failure
//! event tagged with the operation's serial id. [`CompletionBridge`] tracks
//! every outstanding serial id, turns the matching event into a pooled
//! result and resolves the caller's [`CompletionFuture`] with it exactly once.
//!
//! Delivered results are shared handles. Under [`ReleasePolicy::Batched`] the
//! bridge holds on to its own reference until no operation is outstanding,
//! then drops the whole batch; the pooled slot itself only goes back to the
//! pool once the caller has dropped its handle too.

mod download;
mod future;
mod registry;
mod result;
mod web_request;

pub use download::*;
pub use future::*;
pub use registry::*;
pub use result::*;
pub use web_request::*;

#[cfg(test)]
mod web_request_test;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;
use tracing::instrument;
use tracing::trace;
use tracing::warn;

use crate::pool::Pooled;
use crate::pool::ReferencePool;
use crate::BridgeError;
use crate::CompletionConfig;
use crate::ReleasePolicy;
use crate::Result;

/// Result fill captured from an event whose id was not registered yet
type EarlyFill<R> = Box<dyn FnOnce(&mut R, UserData) + Send>;

struct BridgeState<R: CompletionResult> {
    registry: CorrelationRegistry<Pooled<PendingCompletion<R>>>,
    deferred: Vec<SharedResult<R>>,
    /// `start` closures currently running
    starting: usize,
    /// Events for unknown ids received while a start was running
    early: HashMap<SerialId, EarlyFill<R>>,
    shut_down: bool,
}

/// Releases the start slot if the `start` closure unwinds.
struct StartGuard<'a, R: CompletionResult> {
    state: &'a Mutex<BridgeState<R>>,
    armed: bool,
}

impl<R: CompletionResult> Drop for StartGuard<'_, R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        state.starting -= 1;
        if state.starting == 0 {
            state.early.clear();
        }
    }
}

pub struct CompletionBridge<R: CompletionResult> {
    pool: Arc<ReferencePool>,
    release_policy: ReleasePolicy,
    state: Mutex<BridgeState<R>>,
}

impl<R: CompletionResult> CompletionBridge<R> {
    pub fn new(
        pool: Arc<ReferencePool>,
        config: &CompletionConfig,
    ) -> Self {
        Self {
            pool,
            release_policy: config.release_policy,
            state: Mutex::new(BridgeState {
                registry: CorrelationRegistry::new(),
                deferred: Vec::new(),
                starting: 0,
                early: HashMap::new(),
                shut_down: false,
            }),
        }
    }

    /// Starts an operation and returns the future of its outcome.
    ///
    /// `start` hands the request to the task manager and returns the serial
    /// id the manager assigned. It runs without any bridge lock held, so a
    /// manager may deliver the operation's event before `start` returns, from
    /// any thread. Events for unknown ids that arrive while a start is running
    /// are held back and replayed once that id is registered; the rest are
    /// dropped when no start is running any more.
    ///
    /// # Errors
    /// `BridgeError::ShutDown` after [`shutdown`](Self::shutdown); `start` is
    /// not invoked in that case.
    pub fn start_async<F>(
        &self,
        user_data: UserData,
        start: F,
    ) -> Result<CompletionFuture<R>>
    where
        F: FnOnce() -> SerialId,
    {
        {
            let mut state = self.state.lock();
            if state.shut_down {
                return Err(BridgeError::ShutDown.into());
            }
            state.starting += 1;
        }

        let (sender, receiver) = oneshot::channel();
        let mut pending = self.pool.acquire::<PendingCompletion<R>>();
        pending.fill(user_data, sender);

        let mut guard = StartGuard {
            state: &self.state,
            armed: true,
        };
        let serial_id = start();
        guard.armed = false;
        trace!(serial_id, "operation started");

        let (displaced, batch) = {
            let mut state = self.state.lock();
            state.starting -= 1;
            let early = state.early.remove(&serial_id);

            let displaced = if state.shut_down {
                // Dropping `pending` abandons the future.
                debug!(serial_id, "bridge shut down while starting operation");
                None
            } else {
                state.registry.insert(serial_id, pending)
            };

            let batch = match early {
                Some(fill) => {
                    trace!(serial_id, "replaying event received during start");
                    self.resolve(&mut *state, serial_id, fill)
                }
                None => None,
            };

            if state.starting == 0 && !state.early.is_empty() {
                trace!(dropped = state.early.len(), "dropping events for unknown serial ids");
                state.early.clear();
            }
            (displaced, batch)
        };

        if displaced.is_some() {
            warn!(
                serial_id,
                "serial id reused while still outstanding, abandoning the earlier operation"
            );
        }
        drop(batch);

        Ok(CompletionFuture::new(serial_id, receiver))
    }

    /// Resolves `serial_id` with a successful payload.
    ///
    /// Returns `false` when the id is not outstanding and no start is
    /// running; the event is ignored.
    #[instrument(skip(self, payload))]
    pub fn on_success(
        &self,
        serial_id: SerialId,
        payload: R::Payload,
    ) -> bool {
        self.complete(serial_id, |result, user_data| result.fill_success(payload, user_data))
    }

    /// Resolves `serial_id` with an error result.
    ///
    /// The future still resolves successfully; the failure is carried in the
    /// result's `is_error` and `error_message`.
    #[instrument(skip(self))]
    pub fn on_failure(
        &self,
        serial_id: SerialId,
        error_message: String,
    ) -> bool {
        self.complete(serial_id, |result, user_data| {
            result.fill_failure(error_message, user_data)
        })
    }

    /// Stops tracking `serial_id` without a result; its future resolves with
    /// `BridgeError::Abandoned`.
    pub fn abandon(
        &self,
        serial_id: SerialId,
    ) -> bool {
        let (pending, batch) = {
            let mut state = self.state.lock();
            let pending = state.registry.remove(serial_id);
            let batch = Self::take_batch_if_idle(&mut state);
            (pending, batch)
        };

        match pending {
            Some(pending) => {
                debug!(serial_id, "operation abandoned");
                drop(pending);
                drop(batch);
                true
            }
            None => false,
        }
    }

    /// Abandons every outstanding operation; returns how many there were.
    pub fn abandon_all(&self) -> usize {
        let (abandoned, batch) = {
            let mut state = self.state.lock();
            let abandoned = state.registry.drain();
            state.early.clear();
            let batch = std::mem::take(&mut state.deferred);
            (abandoned, batch)
        };

        let count = abandoned.len();
        if count > 0 {
            debug!(count, "abandoning all outstanding operations");
        }
        drop(abandoned);
        drop(batch);
        count
    }

    /// Abandons everything in flight and refuses further operations.
    pub fn shutdown(&self) {
        let (abandoned, batch) = {
            let mut state = self.state.lock();
            state.shut_down = true;
            let abandoned = state.registry.drain();
            state.early.clear();
            let batch = std::mem::take(&mut state.deferred);
            (abandoned, batch)
        };

        if !abandoned.is_empty() {
            warn!(
                count = abandoned.len(),
                "completion bridge shut down with operations outstanding"
            );
        }
        drop(abandoned);
        drop(batch);
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shut_down
    }

    /// Number of operations started and not yet completed
    pub fn outstanding(&self) -> usize {
        self.state.lock().registry.len()
    }

    pub fn is_outstanding(
        &self,
        serial_id: SerialId,
    ) -> bool {
        self.state.lock().registry.contains(serial_id)
    }

    /// Outstanding serial ids in ascending order
    pub fn outstanding_ids(&self) -> Vec<SerialId> {
        self.state.lock().registry.serial_ids()
    }

    /// Number of delivered results the bridge still references
    pub fn deferred_len(&self) -> usize {
        self.state.lock().deferred.len()
    }

    pub fn release_policy(&self) -> ReleasePolicy {
        self.release_policy
    }

    pub fn pool(&self) -> &Arc<ReferencePool> {
        &self.pool
    }

    fn complete<F>(
        &self,
        serial_id: SerialId,
        fill: F,
    ) -> bool
    where
        F: FnOnce(&mut R, UserData) + Send + 'static,
    {
        let batch = {
            let mut state = self.state.lock();
            if state.registry.contains(serial_id) {
                self.resolve(&mut *state, serial_id, Box::new(fill))
            } else if state.starting > 0 {
                trace!(serial_id, "holding event until running starts register");
                state.early.insert(serial_id, Box::new(fill));
                return true;
            } else {
                trace!(serial_id, "ignoring event for unknown serial id");
                return false;
            }
        };

        if let Some(batch) = &batch {
            if !batch.is_empty() {
                trace!(released = batch.len(), "releasing deferred results");
            }
        }
        drop(batch);
        true
    }

    /// Resolves a registered operation. Returns the batch to drop once the
    /// lock is released, `None` when `serial_id` is not registered.
    fn resolve(
        &self,
        state: &mut BridgeState<R>,
        serial_id: SerialId,
        fill: EarlyFill<R>,
    ) -> Option<Vec<SharedResult<R>>> {
        let mut pending = state.registry.remove(serial_id)?;

        let mut result = self.pool.acquire::<R>();
        fill(&mut *result, pending.take_user_data());
        let result = Arc::new(result);

        if let Some(sender) = pending.take_sender() {
            if sender.send(result.clone()).is_err() {
                debug!(serial_id, "completion receiver dropped before resolution");
            }
        }
        drop(pending);

        if self.release_policy == ReleasePolicy::Batched {
            state.deferred.push(result);
        }

        Some(Self::take_batch_if_idle(state))
    }

    fn take_batch_if_idle(state: &mut BridgeState<R>) -> Vec<SharedResult<R>> {
        if state.registry.is_empty() {
            std::mem::take(&mut state.deferred)
        } else {
            Vec::new()
        }
    }
}

impl<R: CompletionResult> std::fmt::Debug for CompletionBridge<R> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CompletionBridge")
            .field("outstanding", &state.registry.len())
            .field("deferred", &state.deferred.len())
            .field("release_policy", &self.release_policy)
            .finish()
    }
}
