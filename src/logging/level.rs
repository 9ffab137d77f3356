use serde::Deserialize;
use serde::Serialize;

/// Severity reported by the host's log-emission hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogType {
    Log,
    Warning,
    Assert,
    Error,
    Exception,
}

impl LogType {
    /// Output level this severity is filtered against
    pub fn output_level(self) -> LogOutputLevel {
        match self {
            LogType::Log => LogOutputLevel::Log,
            LogType::Warning => LogOutputLevel::Warning,
            LogType::Assert => LogOutputLevel::Assert,
            LogType::Error | LogType::Exception => LogOutputLevel::Error,
        }
    }

    /// Error and exception records are written with their stack trace
    pub fn carries_stack_trace(self) -> bool {
        matches!(self, LogType::Error | LogType::Exception)
    }
}

/// Minimum level a record needs to reach the log file.
///
/// `Max` sits above every severity and disables file output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogOutputLevel {
    Log = 0,
    Warning = 1,
    Assert = 2,
    Error = 3,
    #[default]
    Max = 4,
}

impl LogOutputLevel {
    pub fn accepts(
        self,
        log_type: LogType,
    ) -> bool {
        log_type.output_level() >= self
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => LogOutputLevel::Log,
            1 => LogOutputLevel::Warning,
            2 => LogOutputLevel::Assert,
            3 => LogOutputLevel::Error,
            _ => LogOutputLevel::Max,
        }
    }
}
