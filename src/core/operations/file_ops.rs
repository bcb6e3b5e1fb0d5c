use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::core::dataset::DatasetSplit;

/// Result type for file operations
pub type FileOpResult<T> = Result<T, FileOpError>;

/// Error types for file operations
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("File not found: {0:?}")]
    SourceNotFound(PathBuf),
    #[error("Copy failed from {src:?} to {dest:?}: {source}")]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to remove original file {path:?}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileOpError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FileOpError::SourceNotFound(_))
    }
}

/// Create `train`, `val` and `test` under `destination`.
///
/// Directories that already exist are left alone along with their contents.
pub fn ensure_split_dirs(destination: &Path) -> FileOpResult<()> {
    for split in DatasetSplit::all() {
        let dir = destination.join(split.as_str());
        create_dir(&dir)?;
        debug!("Split directory ready: {:?}", dir);
    }
    Ok(())
}

fn create_dir(dir: &Path) -> FileOpResult<()> {
    fs::create_dir_all(dir).map_err(|source| FileOpError::CreateDirFailed {
        path: dir.to_path_buf(),
        source,
    })
}

/// Move a file from source to destination.
///
/// Tries a rename first and falls back to copy + remove when the rename is
/// refused, which happens when source and destination are on different drives.
///
/// # Returns
/// * `Ok(())` if successful
/// * `Err(FileOpError::SourceNotFound)` if `src` does not exist
/// * `Err(FileOpError)` if copy or remove failed
pub fn move_file(src: &Path, dest: &Path) -> FileOpResult<()> {
    debug!("Moving file from {:?} to {:?}", src, dest);

    if !src.exists() {
        return Err(FileOpError::SourceNotFound(src.to_path_buf()));
    }

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir(parent)?;
        }
    }

    match fs::rename(src, dest) {
        Ok(()) => return Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FileOpError::SourceNotFound(src.to_path_buf()));
        }
        Err(e) => {
            warn!("Rename of {:?} failed ({}), falling back to copy", src, e);
        }
    }

    copy_then_remove(src, dest)
}

fn copy_then_remove(src: &Path, dest: &Path) -> FileOpResult<()> {
    if let Err(e) = fs::copy(src, dest) {
        error!("Failed to copy file from {:?} to {:?}: {}", src, dest, e);
        if e.kind() == io::ErrorKind::NotFound && !src.exists() {
            return Err(FileOpError::SourceNotFound(src.to_path_buf()));
        }
        return Err(FileOpError::CopyFailed {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            source: e,
        });
    }

    // Remove the original file after successful copy
    if let Err(e) = fs::remove_file(src) {
        error!("Failed to remove original file {:?} after copy: {}", src, e);
        // Try to clean up the destination file
        let _ = fs::remove_file(dest);
        return Err(FileOpError::RemoveFailed {
            path: src.to_path_buf(),
            source: e,
        });
    }

    Ok(())
}
