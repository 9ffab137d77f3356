use std::collections::VecDeque;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::thread::ThreadId;

use parking_lot::Mutex;
use tracing::debug;
use tracing::error;
use tracing::trace;

use super::LogBuffer;
use super::LogChannel;
use super::LogOutputLevel;
use super::LogRecord;
use crate::constants::LOG_FILE_EXTENSION;
use crate::constants::LOG_WRITER_THREAD_NAME;
use crate::file_io::open_file_for_write;
use crate::time::log_file_stamp;
use crate::time::log_line_stamp;
use crate::LogOutputConfig;
use crate::LogWriterError;
use crate::Result;

/// Persists log records on a dedicated thread.
///
/// Callers on any thread enqueue through [`submit`](Self::submit) or
/// [`dispatch`](Self::dispatch) and never wait on file I/O. The worker drains
/// the buffer in swap epochs, writing and flushing every record in order.
///
/// A write failure stops the writer for good: queued records are discarded
/// and later submissions are dropped.
pub struct BackgroundLogWriter {
    buffer: Arc<LogBuffer>,
    min_level: AtomicU8,
    owner: ThreadId,
    path: PathBuf,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundLogWriter {
    /// Opens `<persistent_data_root>/<log_dir_name>/<start timestamp>.txt` and
    /// starts the worker. The calling thread becomes the owning thread.
    ///
    /// Returns `Ok(None)` when file output is disabled; no directory or file
    /// is created then.
    ///
    /// # Errors
    /// `LogWriterError` when the directory or file cannot be created or the
    /// thread cannot be spawned; nothing keeps running in that case.
    pub fn start(config: &LogOutputConfig) -> Result<Option<Self>> {
        if !config.enabled {
            debug!("file log output disabled");
            return Ok(None);
        }
        Self::start_in(config.log_dir(), config.min_level).map(Some)
    }

    /// Like [`start`](Self::start) with an explicit log directory.
    pub fn start_in(
        log_dir: impl AsRef<Path>,
        min_level: LogOutputLevel,
    ) -> Result<Self> {
        let path = log_dir
            .as_ref()
            .join(format!("{}.{}", log_file_stamp(), LOG_FILE_EXTENSION));
        let file = open_file_for_write(&path)?;
        debug!("file log output at {}", path.display());
        Self::spawn(BufWriter::new(file), path, min_level)
    }

    /// Starts the worker over an arbitrary sink; `path` is informational.
    pub fn spawn<W>(
        sink: W,
        path: PathBuf,
        min_level: LogOutputLevel,
    ) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        let buffer = Arc::new(LogBuffer::new());
        let worker_buffer = buffer.clone();
        let handle = thread::Builder::new()
            .name(LOG_WRITER_THREAD_NAME.to_string())
            .spawn(move || write_loop(worker_buffer, sink))
            .map_err(LogWriterError::Spawn)?;

        Ok(Self {
            buffer,
            min_level: AtomicU8::new(min_level.as_u8()),
            owner: thread::current().id(),
            path,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Queues `record` if its severity passes the minimum level.
    ///
    /// Returns whether the record was queued. After shutdown, or after a
    /// write failure, records are silently dropped.
    pub fn submit(
        &self,
        record: LogRecord,
    ) -> bool {
        if !self.min_level().accepts(record.log_type()) {
            return false;
        }
        self.buffer.push(record)
    }

    /// Entry point for host log hooks.
    ///
    /// `MainThread` records are kept only on the owning thread and
    /// `Threaded` records only elsewhere, so an event that reaches both hooks
    /// is written once.
    pub fn dispatch(
        &self,
        channel: LogChannel,
        record: LogRecord,
    ) -> bool {
        let on_owner = thread::current().id() == self.owner;
        let accepted = match channel {
            LogChannel::MainThread => on_owner,
            LogChannel::Threaded => !on_owner,
        };
        if !accepted {
            return false;
        }
        self.submit(record)
    }

    pub fn min_level(&self) -> LogOutputLevel {
        LogOutputLevel::from_u8(self.min_level.load(Ordering::Acquire))
    }

    pub fn set_min_level(
        &self,
        min_level: LogOutputLevel,
    ) {
        self.min_level.store(min_level.as_u8(), Ordering::Release);
    }

    /// Whether submissions are still accepted
    pub fn is_running(&self) -> bool {
        self.buffer.is_running()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn owner_thread(&self) -> ThreadId {
        self.owner
    }

    /// Stops accepting records, lets the worker write what is already
    /// queued, then joins it and closes the file.
    pub fn shutdown(&self) {
        self.buffer.stop();
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("file log writer thread panicked");
            }
        }
    }
}

impl Drop for BackgroundLogWriter {
    fn drop(&mut self) {
        self.shutdown();
        trace!("BackgroundLogWriter dropped");
    }
}

impl std::fmt::Debug for BackgroundLogWriter {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("BackgroundLogWriter")
            .field("path", &self.path)
            .field("min_level", &self.min_level())
            .finish()
    }
}

fn write_loop<W: Write>(
    buffer: Arc<LogBuffer>,
    mut sink: W,
) {
    let mut writing = VecDeque::new();
    while buffer.swap(&mut writing) {
        while let Some(record) = writing.pop_front() {
            if let Err(e) = record.write_to(&mut sink, &log_line_stamp()) {
                let discarded = writing.len() + buffer.abort();
                writing.clear();
                error!(discarded, "file log write failed, stopping file log output: {}", e);
                return;
            }
        }
    }
    trace!("file log writer drained, closing");
}
