use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::sync::Arc;

use tracing::field::Field;
use tracing::field::Visit;
use tracing::Event;
use tracing::Level;
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::BackgroundLogWriter;
use super::LogChannel;
use super::LogRecord;
use super::LogType;

/// Events emitted by the writer itself never go back into it.
const SELF_TARGET: &str = "ugf_bridge::logging::writer";

/// Field an event may use to supply its own stack trace
const STACK_TRACE_FIELD: &str = "stack_trace";

/// `tracing` layer that forwards events to a [`BackgroundLogWriter`].
///
/// `ERROR` events become [`LogType::Error`] records carrying a stack trace,
/// `WARN` events become [`LogType::Warning`], everything else [`LogType::Log`].
#[derive(Debug, Clone)]
pub struct FileLogLayer {
    writer: Arc<BackgroundLogWriter>,
    channel: Option<LogChannel>,
}

impl FileLogLayer {
    /// Submits every event directly, whatever thread emits it.
    pub fn new(writer: Arc<BackgroundLogWriter>) -> Self {
        Self { writer, channel: None }
    }

    /// Layer for a subscriber that only sees the owning thread's events.
    pub fn main_thread(writer: Arc<BackgroundLogWriter>) -> Self {
        Self {
            writer,
            channel: Some(LogChannel::MainThread),
        }
    }

    /// Layer for a subscriber that sees events from every thread.
    ///
    /// Installed next to a [`main_thread`](Self::main_thread) layer, owning
    /// thread events are written once.
    pub fn threaded(writer: Arc<BackgroundLogWriter>) -> Self {
        Self {
            writer,
            channel: Some(LogChannel::Threaded),
        }
    }

    pub fn writer(&self) -> &Arc<BackgroundLogWriter> {
        &self.writer
    }
}

impl<S> Layer<S> for FileLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(
        &self,
        event: &Event<'_>,
        _ctx: Context<'_, S>,
    ) {
        let metadata = event.metadata();
        if metadata.target().starts_with(SELF_TARGET) {
            return;
        }

        let log_type = log_type_of(metadata.level());
        if !self.writer.min_level().accepts(log_type) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let stack_trace = match visitor.stack_trace.take() {
            Some(trace) => trace,
            None if log_type.carries_stack_trace() => Backtrace::force_capture().to_string(),
            None => String::new(),
        };
        let record = LogRecord::new(visitor.into_text(), stack_trace, log_type);

        match self.channel {
            Some(channel) => self.writer.dispatch(channel, record),
            None => self.writer.submit(record),
        };
    }
}

pub(crate) fn log_type_of(level: &Level) -> LogType {
    match *level {
        Level::ERROR => LogType::Error,
        Level::WARN => LogType::Warning,
        _ => LogType::Log,
    }
}

/// Collects the `message` field and renders the rest as `key=value` pairs.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
    stack_trace: Option<String>,
}

impl MessageVisitor {
    fn into_text(self) -> String {
        match self.message {
            Some(mut message) if !self.fields.is_empty() => {
                message.push(' ');
                message.push_str(&self.fields);
                message
            }
            Some(message) => message,
            None => self.fields,
        }
    }

    fn push_field(
        &mut self,
        field: &Field,
        value: std::fmt::Arguments<'_>,
    ) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }
}

impl Visit for MessageVisitor {
    fn record_str(
        &mut self,
        field: &Field,
        value: &str,
    ) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            STACK_TRACE_FIELD => self.stack_trace = Some(value.to_string()),
            _ => self.push_field(field, format_args!("{value}")),
        }
    }

    fn record_debug(
        &mut self,
        field: &Field,
        value: &dyn std::fmt::Debug,
    ) {
        match field.name() {
            "message" => self.message = Some(format!("{value:?}")),
            STACK_TRACE_FIELD => self.stack_trace = Some(format!("{value:?}")),
            _ => self.push_field(field, format_args!("{value:?}")),
        }
    }
}
