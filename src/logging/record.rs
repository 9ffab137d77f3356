use std::io;
use std::io::Write;

use super::LogType;
use crate::constants::LOG_RECORD_SEPARATOR;

/// Upstream hook a record arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogChannel {
    /// Hook that only fires on the owning thread
    MainThread,
    /// Hook that fires on every thread
    Threaded,
}

/// One log message as reported by the host. Consumed once by the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    text: String,
    stack_trace: String,
    log_type: LogType,
}

impl LogRecord {
    pub fn new(
        text: impl Into<String>,
        stack_trace: impl Into<String>,
        log_type: LogType,
    ) -> Self {
        Self {
            text: text.into(),
            stack_trace: stack_trace.into(),
            log_type,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    /// Writes the persisted form of the record and flushes `sink`.
    ///
    /// Errors and exceptions become a bordered block holding the stack trace;
    /// everything else is a single `<timestamp>\t<text>` line.
    pub(crate) fn write_to<W: Write>(
        &self,
        sink: &mut W,
        timestamp: &str,
    ) -> io::Result<()> {
        if self.log_type.carries_stack_trace() {
            writeln!(sink, "{LOG_RECORD_SEPARATOR}")?;
            writeln!(sink, "{}\t{}\n", timestamp, self.text)?;
            writeln!(sink, "{}", self.stack_trace)?;
            writeln!(sink, "{LOG_RECORD_SEPARATOR}")?;
        } else {
            writeln!(sink, "{}\t{}", timestamp, self.text)?;
        }
        sink.flush()
    }
}
