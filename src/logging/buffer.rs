use std::collections::VecDeque;

use parking_lot::Condvar;
use parking_lot::Mutex;

use super::LogRecord;

struct BufferState {
    waiting: VecDeque<LogRecord>,
    running: bool,
}

/// Double-buffered hand-off between log producers and the single writer.
///
/// Producers append to the `waiting` queue under the lock and signal. The
/// consumer owns the `writing` queue: once it has drained it, it swaps the
/// two under the lock and drains the new batch with the lock released.
pub struct LogBuffer {
    state: Mutex<BufferState>,
    signal: Condvar,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BufferState {
                waiting: VecDeque::new(),
                running: true,
            }),
            signal: Condvar::new(),
        }
    }

    /// Queues a record for the consumer.
    ///
    /// Returns `false` and drops the record once the buffer is stopped.
    pub fn push(
        &self,
        record: LogRecord,
    ) -> bool {
        let mut state = self.state.lock();
        if !state.running {
            return false;
        }
        state.waiting.push_back(record);
        self.signal.notify_one();
        true
    }

    /// Blocks until records are waiting, then swaps them into `writing`.
    ///
    /// `writing` must be empty. Returns `false` once the buffer is stopped and
    /// every record queued before the stop has been handed out.
    pub fn swap(
        &self,
        writing: &mut VecDeque<LogRecord>,
    ) -> bool {
        debug_assert!(writing.is_empty(), "swap with a non-empty writing queue");

        let mut state = self.state.lock();
        while state.waiting.is_empty() && state.running {
            self.signal.wait(&mut state);
        }
        if state.waiting.is_empty() {
            return false;
        }
        std::mem::swap(writing, &mut state.waiting);
        true
    }

    /// Refuses further records; already queued records stay available to `swap`.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.running = false;
        self.signal.notify_all();
    }

    /// Stops and discards everything still waiting; returns the discarded count.
    pub fn abort(&self) -> usize {
        let mut state = self.state.lock();
        state.running = false;
        let discarded = state.waiting.len();
        state.waiting.clear();
        self.signal.notify_all();
        discarded
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Records queued and not yet swapped out
    pub fn waiting_len(&self) -> usize {
        self.state.lock().waiting.len()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}
