use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::tempdir;
use tracing::subscriber::with_default;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;
use ugf_bridge::BackgroundLogWriter;
use ugf_bridge::BridgeSettings;
use ugf_bridge::FileLogLayer;
use ugf_bridge::LogOutputLevel;
use ugf_bridge::LogRecord;
use ugf_bridge::LogType;

use crate::enable_logger;

fn logged_texts(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.split_once('\t').map(|(_, text)| text.to_string()))
        .collect()
}

/// # Case: writer started from settings, fed by host hooks and tracing
///
/// ## Expected
/// - file lives at `<root>/Log/<timestamp>.txt`
/// - records appear in submission order, errors with their stack trace
#[test]
fn test_file_output_from_settings() {
    enable_logger();
    let root = tempdir().unwrap();
    let mut settings = BridgeSettings::default();
    settings.log.enabled = true;
    settings.log.min_level = LogOutputLevel::Log;
    settings.log.persistent_data_root = root.path().to_path_buf();
    let settings = settings.validate().unwrap();

    let writer = Arc::new(BackgroundLogWriter::start(&settings.log).unwrap().expect("file output enabled"));
    assert_eq!(writer.path().parent(), Some(root.path().join("Log").as_path()));

    writer.submit(LogRecord::new("boot", "", LogType::Log));
    with_default(Registry::default().with(FileLogLayer::new(writer.clone())), || {
        tracing::warn!(target: "game", "slow frame");
    });
    writer.submit(LogRecord::new("crash", "at Boss.Attack()", LogType::Exception));
    writer.shutdown();

    let content = fs::read_to_string(writer.path()).unwrap();
    assert_eq!(logged_texts(&content), vec!["boot", "slow frame", "crash"]);
    assert!(content.contains("at Boss.Attack()"));
}

/// # Case: settings leave file output disabled
///
/// ## Expected
/// - no writer is started and nothing is created under the root
#[test]
fn test_disabled_output_from_settings() {
    enable_logger();
    let root = tempdir().unwrap();
    let mut settings = BridgeSettings::default();
    settings.log.min_level = LogOutputLevel::Log;
    settings.log.persistent_data_root = root.path().to_path_buf();
    let settings = settings.validate().unwrap();

    assert!(BackgroundLogWriter::start(&settings.log).unwrap().is_none());
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}

/// # Case: many producer threads share one writer
///
/// ## Expected
/// - every accepted record is written exactly once
#[test]
fn test_burst_from_many_threads() {
    enable_logger();
    let root = tempdir().unwrap();
    let writer = Arc::new(BackgroundLogWriter::start_in(root.path(), LogOutputLevel::Warning).unwrap());

    let producers: Vec<_> = (0..6)
        .map(|p| {
            let writer = writer.clone();
            thread::spawn(move || {
                let mut accepted = 0;
                for i in 0..300 {
                    let log_type = if i % 2 == 0 { LogType::Warning } else { LogType::Log };
                    if writer.submit(LogRecord::new(format!("{p}:{i}"), "", log_type)) {
                        accepted += 1;
                    }
                }
                accepted
            })
        })
        .collect();
    let accepted: usize = producers.into_iter().map(|p| p.join().unwrap()).sum();
    writer.shutdown();

    let content = fs::read_to_string(writer.path()).unwrap();
    let mut texts = logged_texts(&content);
    assert_eq!(accepted, 6 * 150);
    assert_eq!(texts.len(), accepted);
    texts.sort();
    texts.dedup();
    assert_eq!(texts.len(), accepted);
}
