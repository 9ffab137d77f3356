use std::fs::create_dir_all;
use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;

use tracing::debug;
use tracing::error;

use crate::LogWriterError;
use crate::Result;

pub fn create_parent_dir_if_not_exist(path: &Path) -> Result<()> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.exists() {
            if let Err(e) = create_dir_all(parent_dir) {
                error!("Failed to create log directory: {:?}", e);
                return Err(LogWriterError::CreateDir {
                    path: parent_dir.to_path_buf(),
                    source: e,
                }
                .into());
            }
            debug!("created directory: {:?}", parent_dir);
        }
    }
    Ok(())
}

/// Opens `path` for writing from scratch, replacing any existing file.
pub fn open_file_for_write(path: &Path) -> Result<File> {
    create_parent_dir_if_not_exist(path)?;
    let file = match OpenOptions::new().write(true).create(true).truncate(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            return Err(LogWriterError::Open {
                path: path.to_path_buf(),
                source: e,
            }
            .into());
        }
    };
    Ok(file)
}
