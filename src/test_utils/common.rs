use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::CompletionConfig;
use crate::PoolConfig;
use crate::ReferencePool;
use crate::ReleasePolicy;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

pub fn test_pool() -> Arc<ReferencePool> {
    Arc::new(ReferencePool::new(PoolConfig::default()))
}

pub fn completion_config(release_policy: ReleasePolicy) -> CompletionConfig {
    CompletionConfig { release_policy }
}

/// The only file under `dir`; panics when there is not exactly one
pub fn single_log_file(dir: &Path) -> PathBuf {
    let files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("read_dir {}: {e}", dir.display()))
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1, "expected one log file in {}, got {:?}", dir.display(), files);
    files.into_iter().next().unwrap()
}

/// Text of every `<timestamp>\t<text>` line, in file order
pub fn logged_texts(path: &Path) -> Vec<String> {
    let content = fs::read_to_string(path).unwrap();
    content
        .lines()
        .filter_map(|line| line.split_once('\t').map(|(_, text)| text.to_string()))
        .collect()
}

/// In-memory sink shared with the test
#[derive(Clone, Default)]
pub struct SharedSink {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedSink {
    pub fn contents(&self) -> String {
        String::from_utf8(self.bytes.lock().clone()).unwrap()
    }
}

impl Write for SharedSink {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that accepts `budget` writes and fails every write after that
pub struct FailingSink {
    budget: usize,
}

impl FailingSink {
    pub fn after(budget: usize) -> Self {
        Self { budget }
    }
}

impl Write for FailingSink {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::other("disk full"));
        }
        self.budget -= 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
