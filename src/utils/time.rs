use chrono::Local;

use crate::constants::LOG_FILE_NAME_FORMAT;
use crate::constants::LOG_LINE_TIMESTAMP_FORMAT;

/// Local time formatted for a log file name
pub(crate) fn log_file_stamp() -> String {
    Local::now().format(LOG_FILE_NAME_FORMAT).to_string()
}

/// Local time formatted for the head of a log line
pub(crate) fn log_line_stamp() -> String {
    Local::now().format(LOG_LINE_TIMESTAMP_FORMAT).to_string()
}
