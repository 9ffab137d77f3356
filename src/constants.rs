// -
// Log file layout

/// Subdirectory of the persistent-data root holding the log files
pub(crate) const DEFAULT_LOG_DIR_NAME: &str = "Log";

/// Extension of every log file
pub(crate) const LOG_FILE_EXTENSION: &str = "txt";

/// File-name timestamp of a writer's start time
pub(crate) const LOG_FILE_NAME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Line timestamp of every written record
pub(crate) const LOG_LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Border wrapped around error and exception records
pub(crate) const LOG_RECORD_SEPARATOR: &str =
    "---------------------------------------------------------------------------------------------------------------------";

// -
// Task manager defaults

/// Priority the await extensions pass to the managers
pub(crate) const DEFAULT_PRIORITY: i32 = 0;

/// Name of the background writer thread
pub(crate) const LOG_WRITER_THREAD_NAME: &str = "ugf-file-log";
